//! In-memory record store.
//!
//! One `RwLock`-guarded collection per entity. Id assignment and timestamping
//! happen under the collection's write lock, so concurrent creates of the same
//! entity never collide and `created_at` never goes backwards.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use labwarden_common::{
    ComplianceTask, Experiment, LabNote, NewComplianceTask, NewExperiment, NewLabNote,
    NewSafetyReport, SafetyReport, TaskUpdate,
};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::store::{deadline_order, RecordStore, StoreKind, StoreStats};

struct Collection<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
    last_created_at: Option<DateTime<Utc>>,
}

impl<T: Clone> Collection<T> {
    fn new() -> Self {
        Self { rows: BTreeMap::new(), next_id: 1, last_created_at: None }
    }

    fn insert_with(&mut self, build: impl FnOnce(i64, DateTime<Utc>) -> T) -> T {
        self.insert_at(Utc::now(), build)
    }

    /// Insert stamped with `now`, clamped to the previous insert in case the
    /// wall clock stepped back.
    fn insert_at(&mut self, now: DateTime<Utc>, build: impl FnOnce(i64, DateTime<Utc>) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;

        let created_at = match self.last_created_at {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_created_at = Some(created_at);

        let row = build(id, created_at);
        self.rows.insert(id, row.clone());
        row
    }

    fn get(&self, id: i64) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    /// Highest id first, then a stable sort on `created_at` descending.
    fn newest_first(&self, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
        let mut rows: Vec<T> = self.rows.values().rev().cloned().collect();
        rows.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
        rows
    }

    fn len(&self) -> u64 {
        self.rows.len() as u64
    }
}

/// Process-local store. Created once at startup and shared via `Arc`.
pub struct MemoryStore {
    experiments: RwLock<Collection<Experiment>>,
    lab_notes: RwLock<Collection<LabNote>>,
    compliance_tasks: RwLock<Collection<ComplianceTask>>,
    safety_reports: RwLock<Collection<SafetyReport>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            experiments: RwLock::new(Collection::new()),
            lab_notes: RwLock::new(Collection::new()),
            compliance_tasks: RwLock::new(Collection::new()),
            safety_reports: RwLock::new(Collection::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Memory
    }

    // ── Experiments ─────────────────────────────────────────────────────────

    async fn list_experiments(&self) -> Result<Vec<Experiment>> {
        Ok(self.experiments.read().await.newest_first(|e| e.created_at))
    }

    async fn get_experiment(&self, id: i64) -> Result<Option<Experiment>> {
        Ok(self.experiments.read().await.get(id))
    }

    async fn create_experiment(&self, new: NewExperiment) -> Result<Experiment> {
        let mut rows = self.experiments.write().await;
        let exp = rows.insert_with(|id, at| new.into_record(id, at));
        tracing::debug!(id = exp.id, compound = %exp.compound_name, "experiment stored");
        Ok(exp)
    }

    // ── Lab notes ───────────────────────────────────────────────────────────

    async fn list_lab_notes(&self) -> Result<Vec<LabNote>> {
        Ok(self.lab_notes.read().await.newest_first(|n| n.created_at))
    }

    async fn get_lab_note(&self, id: i64) -> Result<Option<LabNote>> {
        Ok(self.lab_notes.read().await.get(id))
    }

    async fn create_lab_note(&self, new: NewLabNote) -> Result<LabNote> {
        let mut rows = self.lab_notes.write().await;
        Ok(rows.insert_with(|id, at| new.into_record(id, at)))
    }

    // ── Compliance tasks ────────────────────────────────────────────────────

    async fn list_compliance_tasks(&self) -> Result<Vec<ComplianceTask>> {
        let mut tasks: Vec<ComplianceTask> =
            self.compliance_tasks.read().await.rows.values().cloned().collect();
        tasks.sort_by(deadline_order);
        Ok(tasks)
    }

    async fn get_compliance_task(&self, id: i64) -> Result<Option<ComplianceTask>> {
        Ok(self.compliance_tasks.read().await.get(id))
    }

    async fn create_compliance_task(&self, new: NewComplianceTask) -> Result<ComplianceTask> {
        let mut rows = self.compliance_tasks.write().await;
        Ok(rows.insert_with(|id, at| new.into_record(id, at)))
    }

    async fn update_compliance_task(&self, id: i64, update: TaskUpdate) -> Result<Option<ComplianceTask>> {
        let mut rows = self.compliance_tasks.write().await;
        let Some(task) = rows.rows.get_mut(&id) else {
            return Ok(None);
        };
        task.apply(&update);
        tracing::debug!(id, status = %task.status, "compliance task updated");
        Ok(Some(task.clone()))
    }

    // ── Safety reports ──────────────────────────────────────────────────────

    async fn list_safety_reports(&self) -> Result<Vec<SafetyReport>> {
        Ok(self.safety_reports.read().await.newest_first(|r| r.created_at))
    }

    async fn get_safety_report(&self, id: i64) -> Result<Option<SafetyReport>> {
        Ok(self.safety_reports.read().await.get(id))
    }

    async fn create_safety_report(&self, new: NewSafetyReport) -> Result<SafetyReport> {
        let mut rows = self.safety_reports.write().await;
        Ok(rows.insert_with(|id, at| new.into_record(id, at)))
    }

    async fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            experiments: self.experiments.read().await.len(),
            lab_notes: self.lab_notes.read().await.len(),
            compliance_tasks: self.compliance_tasks.read().await.len(),
            safety_reports: self.safety_reports.read().await.len(),
        })
    }
}
