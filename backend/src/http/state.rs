//! Application state for the HTTP server.

use std::sync::Arc;

use crate::bindings::Dashboard;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard: Arc::new(dashboard),
        }
    }
}
