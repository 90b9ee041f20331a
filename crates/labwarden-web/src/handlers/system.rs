//! Liveness and backend identification.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub storage: &'static str,
    pub model: String,
    pub version: &'static str,
}

/// GET /api/health
pub async fn health(State(state): State<SharedState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        storage: state.store.kind().as_str(),
        model: state.assessor.model_id().to_string(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
