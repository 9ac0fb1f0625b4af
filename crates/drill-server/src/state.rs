//! Server state management.

use std::sync::Arc;

use drill_core::{DrillEngine, InMemoryStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<DrillEngine>,
    store: Arc<InMemoryStore>,
    api_key: Option<Arc<str>>,
}

impl AppState {
    /// Create state over an engine and the store it was built on.
    pub fn new(engine: DrillEngine, store: Arc<InMemoryStore>) -> Self {
        Self {
            engine: Arc::new(engine),
            store,
            api_key: None,
        }
    }

    /// Require `Authorization: Bearer <key>` on drill routes.
    ///
    /// An empty key leaves the routes open.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty()).map(Arc::from);
        self
    }

    pub fn engine(&self) -> &DrillEngine {
        &self.engine
    }

    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}
