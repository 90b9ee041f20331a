//! Safety incident report endpoints. Reports are immutable once filed.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use labwarden_common::{ApiError, SafetyReport, SafetyReportInput};

use crate::handlers::store_fault;
use crate::state::SharedState;

/// GET /api/safety-reports - newest first
pub async fn list_safety_reports(
    State(state): State<SharedState>,
) -> Result<Json<Vec<SafetyReport>>, ApiError> {
    let rows = state
        .store
        .list_safety_reports()
        .await
        .map_err(|e| store_fault("Failed to fetch safety reports", e))?;
    Ok(Json(rows))
}

/// POST /api/safety-reports
pub async fn create_safety_report(
    State(state): State<SharedState>,
    body: Result<Json<SafetyReportInput>, JsonRejection>,
) -> Result<Json<SafetyReport>, ApiError> {
    let Json(input) = body?;
    let report = state
        .store
        .create_safety_report(input.validate()?)
        .await
        .map_err(|e| store_fault("Failed to create safety report", e))?;

    tracing::warn!(
        id = report.id,
        severity = %report.severity,
        incident_date = %report.incident_date,
        "safety incident reported"
    );
    Ok(Json(report))
}
