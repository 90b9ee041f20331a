//! Dashboard summary: counts and the latest experiments.

use axum::{extract::State, Json};
use serde::Serialize;

use labwarden_common::{ApiError, Experiment, HazardLevel, TaskStatus};

use crate::handlers::store_fault;
use crate::state::SharedState;

const RECENT_EXPERIMENTS: usize = 5;

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct HazardCounts {
    pub safe: u64,
    pub caution: u64,
    pub danger: u64,
    pub critical: u64,
}

impl HazardCounts {
    pub fn tally(experiments: &[Experiment]) -> Self {
        let mut counts = Self::default();
        for exp in experiments {
            match exp.hazard_level {
                HazardLevel::Safe     => counts.safe += 1,
                HazardLevel::Caution  => counts.caution += 1,
                HazardLevel::Danger   => counts.danger += 1,
                HazardLevel::Critical => counts.critical += 1,
            }
        }
        counts
    }

    /// Danger plus critical.
    pub fn active(&self) -> u64 {
        self.danger + self.critical
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_experiments: u64,
    pub hazard_counts: HazardCounts,
    pub active_hazards: u64,
    pub recent_experiments: Vec<Experiment>,
    pub lab_notes: u64,
    pub pending_tasks: u64,
    pub completed_tasks: u64,
    pub safety_reports: u64,
}

/// GET /api/dashboard
pub async fn dashboard(
    State(state): State<SharedState>,
) -> Result<Json<DashboardSummary>, ApiError> {
    let fail = |e| store_fault("Failed to load dashboard", e);

    let experiments = state.store.list_experiments().await.map_err(fail)?;
    let tasks = state.store.list_compliance_tasks().await.map_err(fail)?;
    let stats = state.store.stats().await.map_err(fail)?;

    let hazard_counts = HazardCounts::tally(&experiments);
    let pending_tasks = tasks.iter().filter(|t| t.status == TaskStatus::Pending).count() as u64;

    Ok(Json(DashboardSummary {
        total_experiments: experiments.len() as u64,
        active_hazards: hazard_counts.active(),
        hazard_counts,
        recent_experiments: experiments.into_iter().take(RECENT_EXPERIMENTS).collect(),
        lab_notes: stats.lab_notes,
        pending_tasks,
        completed_tasks: tasks.len() as u64 - pending_tasks,
        safety_reports: stats.safety_reports,
    }))
}
