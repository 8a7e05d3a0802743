//! Diagnostic logging - console plus a daily file under LOG_DIR
//!
//! Not the access log: that one is a plain `timestamp - ip` file written by
//! `access_log`. Everything here goes through `tracing`.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const FILE_PREFIX: &str = "track_dashboard.log";
const DEFAULT_DIRECTIVES: &str = "info,track_dashboard=debug,tower_http=debug";

/// RUST_LOG wins when it parses; otherwise the crate logs at debug
fn env_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the global subscriber. Keep the returned guard alive until exit
/// so buffered file lines are flushed.
pub fn init_logging(log_dir: &str) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(Path::new(log_dir))?;

    let (file_writer, guard) =
        tracing_appender::non_blocking(RollingFileAppender::new(Rotation::DAILY, log_dir, FILE_PREFIX));

    let rust_log = std::env::var("RUST_LOG").ok();

    tracing_subscriber::registry()
        .with(env_filter(rust_log.as_deref()))
        .with(fmt::layer().with_target(true).with_file(true).with_line_number(true))
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init()?;

    tracing::info!("Diagnostic log directory: {}", log_dir);
    Ok(guard)
}
