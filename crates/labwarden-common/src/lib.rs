//! labwarden-common: Shared record types, request inputs, and errors used across all labwarden crates.

pub mod error;
pub mod records;
pub mod input;

// Re-export commonly used types
pub use error::{ApiError, ValidationError};
pub use records::{
    ComplianceTask, Experiment, HazardLevel, LabNote, SafetyReport, Severity, TaskStatus,
    NewComplianceTask, NewExperiment, NewLabNote, NewSafetyReport, TaskUpdate,
};
pub use input::{
    ComplianceTaskInput, DecimalText, ExperimentInput, ExperimentParams, LabNoteInput,
    SafetyReportInput, TaskUpdateInput,
};
