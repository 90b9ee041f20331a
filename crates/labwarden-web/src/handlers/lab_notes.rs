//! Lab note endpoints.

use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Query, State},
    Json,
};
use serde::Deserialize;

use labwarden_common::{ApiError, LabNote, LabNoteInput};

use crate::handlers::store_fault;
use crate::state::SharedState;

#[derive(Debug, Deserialize, Default)]
pub struct NoteFilter {
    /// Case-insensitive search over title, content and tags.
    pub q: Option<String>,
}

/// GET /api/lab-notes?q=term
pub async fn list_lab_notes(
    State(state): State<SharedState>,
    filter: Result<Query<NoteFilter>, QueryRejection>,
) -> Result<Json<Vec<LabNote>>, ApiError> {
    let Query(filter) = filter?;
    let mut notes = state
        .store
        .list_lab_notes()
        .await
        .map_err(|e| store_fault("Failed to fetch lab notes", e))?;

    if let Some(q) = filter.q.as_deref() {
        notes.retain(|note| note.matches(q));
    }
    Ok(Json(notes))
}

/// POST /api/lab-notes
pub async fn create_lab_note(
    State(state): State<SharedState>,
    body: Result<Json<LabNoteInput>, JsonRejection>,
) -> Result<Json<LabNote>, ApiError> {
    let Json(input) = body?;
    let note = state
        .store
        .create_lab_note(input.validate()?)
        .await
        .map_err(|e| store_fault("Failed to create lab note", e))?;

    tracing::info!(id = note.id, tags = note.tag_list().len(), "lab note created");
    Ok(Json(note))
}
