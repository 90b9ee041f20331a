//! Compliance task endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;

use labwarden_common::{ApiError, ComplianceTask, ComplianceTaskInput, TaskStatus, TaskUpdateInput};

use crate::handlers::store_fault;
use crate::state::SharedState;

#[derive(Debug, Deserialize, Default)]
pub struct TaskFilter {
    pub status: Option<String>,
}

/// GET /api/compliance-tasks?status=pending|completed - soonest deadline first
pub async fn list_compliance_tasks(
    State(state): State<SharedState>,
    filter: Result<Query<TaskFilter>, QueryRejection>,
) -> Result<Json<Vec<ComplianceTask>>, ApiError> {
    let Query(filter) = filter?;
    let status = match filter.status.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => Some(s.parse::<TaskStatus>()?),
        _ => None,
    };

    let mut tasks = state
        .store
        .list_compliance_tasks()
        .await
        .map_err(|e| store_fault("Failed to fetch compliance tasks", e))?;

    if let Some(status) = status {
        tasks.retain(|t| t.status == status);
    }
    Ok(Json(tasks))
}

/// POST /api/compliance-tasks
pub async fn create_compliance_task(
    State(state): State<SharedState>,
    body: Result<Json<ComplianceTaskInput>, JsonRejection>,
) -> Result<Json<ComplianceTask>, ApiError> {
    let Json(input) = body?;
    let task = state
        .store
        .create_compliance_task(input.validate()?)
        .await
        .map_err(|e| store_fault("Failed to create compliance task", e))?;

    tracing::info!(id = task.id, deadline = %task.deadline, status = %task.status, "compliance task created");
    Ok(Json(task))
}

/// PATCH /api/compliance-tasks/{id}
///
/// Only `status` is applied. A body without it, or no body at all, changes
/// nothing and echoes the current record.
pub async fn update_compliance_task(
    State(state): State<SharedState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Option<Json<TaskUpdateInput>>, JsonRejection>,
) -> Result<Json<ComplianceTask>, ApiError> {
    let Path(id) = id?;
    let input = body?.map(|Json(input)| input).unwrap_or_default();
    let update = input.validate()?;

    let task = if update.status.is_some() {
        state.store.update_compliance_task(id, update).await
    } else {
        state.store.get_compliance_task(id).await
    }
    .map_err(|e| store_fault("Failed to update compliance task", e))?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::info!(id = task.id, status = %task.status, "compliance task updated");
    Ok(Json(task))
}
