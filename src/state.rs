//! Application State - shared by every request
//!
//! Built once at startup; nothing in it changes afterwards, so handlers
//! read it without locking.

use std::sync::Arc;

use crate::access_log::AccessSink;
use crate::config::PageConfig;
use crate::dataset::Table;

#[derive(Clone)]
pub struct AppState {
    pub table: Arc<Table>,
    pub page: Arc<PageConfig>,
    pub access_log: Option<Arc<dyn AccessSink>>,
}

impl AppState {
    pub fn new(table: Table, page: PageConfig) -> Self {
        Self {
            table: Arc::new(table),
            page: Arc::new(page),
            access_log: None,
        }
    }

    pub fn with_access_log(mut self, sink: Arc<dyn AccessSink>) -> Self {
        self.access_log = Some(sink);
        self
    }
}
