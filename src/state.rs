//! Application state shared across handlers

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::store::UserStore;

/// Application state shared across handlers
///
/// One global lock around the whole store: handlers hold it for the full
/// guard-then-mutate sequence so every request observes a consistent
/// snapshot.
#[derive(Clone, Default)]
pub struct AppState {
    pub store: Arc<Mutex<UserStore>>,
}

impl AppState {
    /// Create state with an empty store
    pub fn new() -> Self {
        Self::default()
    }
}
