//! Experiment endpoints: listing and AI-assessed creation.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use labwarden_common::{ApiError, Experiment, ExperimentInput};

use crate::handlers::store_fault;
use crate::state::SharedState;

/// GET /api/experiments - newest first
pub async fn list_experiments(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Experiment>>, ApiError> {
    let rows = state
        .store
        .list_experiments()
        .await
        .map_err(|e| store_fault("Failed to fetch experiments", e))?;
    Ok(Json(rows))
}

/// POST /api/experiments/predict
///
/// Validate, assess, then store. Nothing is stored unless the assessment
/// call returned, and nothing is sent upstream unless validation passed.
pub async fn predict_experiment(
    State(state): State<SharedState>,
    body: Result<Json<ExperimentInput>, JsonRejection>,
) -> Result<Json<Experiment>, ApiError> {
    let Json(input) = body?;
    let params = input.validate()?;

    let assessment = state
        .assessor
        .assess(&params)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    let experiment = state
        .store
        .create_experiment(assessment.into_new_experiment(params))
        .await
        .map_err(|e| store_fault("Failed to save experiment", e))?;

    tracing::info!(
        id = experiment.id,
        compound = %experiment.compound_name,
        hazard_level = %experiment.hazard_level,
        "experiment recorded"
    );
    Ok(Json(experiment))
}
