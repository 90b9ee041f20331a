//! Axum router: maps all URL paths to handlers.

use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::{
    services::ServeDir,
    cors::CorsLayer,
    trace::TraceLayer,
    compression::CompressionLayer,
};
use std::path::PathBuf;
use std::sync::Arc;
use crate::state::{AppState, SharedState};
use crate::handlers::{
    experiments::{list_experiments, predict_experiment},
    lab_notes::{list_lab_notes, create_lab_note},
    compliance::{list_compliance_tasks, create_compliance_task, update_compliance_task},
    safety_reports::{list_safety_reports, create_safety_report},
    dashboard::dashboard,
    system::health,
};

/// Build and return the full Axum router.
///
/// With `static_dir` set, any path no route matches is served from that
/// directory (the bundled front end).
pub fn build_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let shared: SharedState = Arc::new(state);

    let mut router = Router::new()
        .route("/api/experiments",          get(list_experiments))
        .route("/api/experiments/predict",  post(predict_experiment))
        .route("/api/lab-notes",            get(list_lab_notes).post(create_lab_note))
        .route("/api/compliance-tasks",     get(list_compliance_tasks).post(create_compliance_task))
        .route("/api/compliance-tasks/{id}", patch(update_compliance_task))
        .route("/api/safety-reports",       get(list_safety_reports).post(create_safety_report))
        .route("/api/dashboard",            get(dashboard))
        .route("/api/health",               get(health));

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
