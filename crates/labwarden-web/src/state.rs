//! Shared application state for the web server.

use std::sync::Arc;

use labwarden_db::RecordStore;
use labwarden_llm::HazardAssessor;

/// Shared state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub assessor: HazardAssessor,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, assessor: HazardAssessor) -> Self {
        Self { store, assessor }
    }
}

pub type SharedState = Arc<AppState>;
