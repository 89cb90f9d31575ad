use std::sync::Arc;

use crate::scheduler::HistoryStore;

/// Shared state for API handlers: the read side of the history store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<HistoryStore>,
}
