//! Application state for the web layer.

use std::sync::Arc;

use crate::store::ScheduleStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Schedule database
    pub store: Arc<dyn ScheduleStore>,
}

impl AppState {
    /// Create a new app state owning `store`.
    pub fn new(store: impl ScheduleStore + 'static) -> Self {
        Self::shared(Arc::new(store))
    }

    /// Create a new app state from a store that is also used elsewhere.
    pub fn shared(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }
}
