//! Shared application state for the HTTP server.

use std::sync::Arc;

use workplace::workflow::Workflows;

/// Shared state accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Both workflows, compiled once at startup.
    pub workflows: Arc<Workflows>,
}

impl AppState {
    pub fn new(workflows: Workflows) -> Self {
        Self {
            workflows: Arc::new(workflows),
        }
    }
}
