//! The narrow storage interface shared by every backend.

use async_trait::async_trait;
use labwarden_common::{
    ComplianceTask, Experiment, LabNote, NewComplianceTask, NewExperiment, NewLabNote,
    NewSafetyReport, SafetyReport, TaskUpdate,
};
use std::cmp::Ordering;

use crate::error::Result;

/// Which backend a store is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Postgres,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Memory   => "memory",
            StoreKind::Postgres => "postgres",
        }
    }
}

/// Row counts per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub experiments: u64,
    pub lab_notes: u64,
    pub compliance_tasks: u64,
    pub safety_reports: u64,
}

/// Sole writer and source of truth for all lab records.
///
/// `create_*` assigns a fresh, strictly increasing id and the creation
/// timestamp. Lookups report absence as `Ok(None)`, never as an error.
///
/// Ordering contract for `list_*`:
/// - experiments, lab notes, safety reports: newest `created_at` first
/// - compliance tasks: soonest `deadline` first
#[async_trait]
pub trait RecordStore: Send + Sync {
    fn kind(&self) -> StoreKind;

    // Experiments
    async fn list_experiments(&self) -> Result<Vec<Experiment>>;
    async fn get_experiment(&self, id: i64) -> Result<Option<Experiment>>;
    async fn create_experiment(&self, new: NewExperiment) -> Result<Experiment>;

    // Lab notes
    async fn list_lab_notes(&self) -> Result<Vec<LabNote>>;
    async fn get_lab_note(&self, id: i64) -> Result<Option<LabNote>>;
    async fn create_lab_note(&self, new: NewLabNote) -> Result<LabNote>;

    // Compliance tasks
    async fn list_compliance_tasks(&self) -> Result<Vec<ComplianceTask>>;
    async fn get_compliance_task(&self, id: i64) -> Result<Option<ComplianceTask>>;
    async fn create_compliance_task(&self, new: NewComplianceTask) -> Result<ComplianceTask>;
    /// Merge `update` into the task; `Ok(None)` if no task has this id.
    async fn update_compliance_task(&self, id: i64, update: TaskUpdate) -> Result<Option<ComplianceTask>>;

    // Safety reports
    async fn list_safety_reports(&self) -> Result<Vec<SafetyReport>>;
    async fn get_safety_report(&self, id: i64) -> Result<Option<SafetyReport>>;
    async fn create_safety_report(&self, new: NewSafetyReport) -> Result<SafetyReport>;

    async fn stats(&self) -> Result<StoreStats>;
}

/// Soonest deadline first. Parsable dates sort before unparsable text,
/// which falls back to lexical order; ties go to the older id.
pub fn deadline_order(a: &ComplianceTask, b: &ComplianceTask) -> Ordering {
    let by_deadline = match (a.deadline_date(), b.deadline_date()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None)    => Ordering::Less,
        (None, Some(_))    => Ordering::Greater,
        (None, None)       => a.deadline.cmp(&b.deadline),
    };
    by_deadline.then(a.id.cmp(&b.id))
}
