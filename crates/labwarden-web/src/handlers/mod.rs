//! HTTP handlers for all API routes.

pub mod experiments;
pub mod lab_notes;
pub mod compliance;
pub mod safety_reports;
pub mod dashboard;
pub mod system;

use labwarden_common::ApiError;
use labwarden_db::DbError;

/// Log a store fault and answer with a generic 500 naming the operation.
pub(crate) fn store_fault(operation: &str, err: DbError) -> ApiError {
    tracing::error!(error = %err, "{operation}");
    ApiError::Internal(operation.to_string())
}
