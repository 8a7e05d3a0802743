//! Track Dashboard
//!
//! Serves a filterable 3D scatter of sensor types, signal-processing
//! techniques and track parameters loaded from a CSV cross-table.
//! Configured from the environment only (see `config::Settings`).

mod access_log;
mod chart;
mod config;
mod dataset;
mod filter;
mod logging;
mod page;
mod server;
mod state;

use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = config::Settings::load();

    // Initialize logging first
    let _log_guard = logging::init_logging(&settings.log_dir)?;
    tracing::info!("Track Dashboard starting up");
    tracing::debug!("Settings: {:?}", settings);

    let page = config::PageConfig::load_or_default(&settings.page_config)?;

    // A dataset that fails to load stops startup before the port is bound
    let table = match dataset::Table::load(&settings.data_file) {
        Ok(table) => table,
        Err(e) => {
            tracing::error!("Failed to load dataset: {}", e);
            return Err(e.into());
        }
    };

    if table.is_empty() {
        tracing::warn!("Dataset {:?} has no rows; the chart will be empty", settings.data_file);
    }

    let mut state = state::AppState::new(table, page);
    if let Some(path) = &settings.access_log {
        tracing::info!("Access log: {:?}", path);
        state = state.with_access_log(Arc::new(access_log::FileSink::new(path)));
    }

    server::serve(state, settings.port).await
}
