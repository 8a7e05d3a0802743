//! Access log - one `timestamp - client address` line per request
//!
//! Best effort: the line is written after the response is built, on a
//! blocking task, and failures only reach the diagnostic log.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::state::AppState;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Append-only destination for access entries
pub trait AccessSink: Send + Sync {
    fn append(&self, timestamp: DateTime<Local>, client: &str) -> std::io::Result<()>;
}

pub fn format_line(timestamp: DateTime<Local>, client: &str) -> String {
    format!("{} - {}\n", timestamp.format(TIMESTAMP_FORMAT), client)
}

/// Flat file opened in append mode for every line
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl AccessSink for FileSink {
    fn append(&self, timestamp: DateTime<Local>, client: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        // Single write call so concurrent appenders never interleave within a line
        file.write_all(format_line(timestamp, client).as_bytes())
    }
}

/// Middleware: run the request, then hand the log write off
pub async fn record(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let timestamp = Local::now();

    let response = next.run(request).await;

    if let Some(sink) = state.access_log.clone() {
        tokio::task::spawn_blocking(move || write_entry(sink, timestamp, &client));
    }
    response
}

fn write_entry(sink: Arc<dyn AccessSink>, timestamp: DateTime<Local>, client: &str) {
    if let Err(e) = sink.append(timestamp, client) {
        tracing::warn!("Access log write failed for {}: {}", client, e);
    }
}
