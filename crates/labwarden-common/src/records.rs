//! Record types for the four lab collections.
//! These are the Rust representations of the rows served over `/api/*`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Hazard level
// ---------------------------------------------------------------------------

/// Classification assigned to an experiment by the assessment pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HazardLevel {
    Safe,
    #[default]
    Caution,
    Danger,
    Critical,
}

impl HazardLevel {
    pub const ALL: [HazardLevel; 4] = [
        HazardLevel::Safe,
        HazardLevel::Caution,
        HazardLevel::Danger,
        HazardLevel::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HazardLevel::Safe     => "safe",
            HazardLevel::Caution  => "caution",
            HazardLevel::Danger   => "danger",
            HazardLevel::Critical => "critical",
        }
    }

    /// Danger and critical experiments count as active hazards on the dashboard.
    pub fn is_active_hazard(&self) -> bool {
        matches!(self, HazardLevel::Danger | HazardLevel::Critical)
    }
}

impl FromStr for HazardLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "safe"     => Ok(HazardLevel::Safe),
            "caution"  => Ok(HazardLevel::Caution),
            "danger"   => Ok(HazardLevel::Danger),
            "critical" => Ok(HazardLevel::Critical),
            _ => Err(ValidationError::invalid_value("hazardLevel", s, "safe|caution|danger|critical")),
        }
    }
}

impl fmt::Display for HazardLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Task status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending   => "pending",
            TaskStatus::Completed => "completed",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending"   => Ok(TaskStatus::Pending),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(ValidationError::invalid_value("status", s, "pending|completed")),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Incident severity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low      => "low",
            Severity::Medium   => "medium",
            Severity::High     => "high",
            Severity::Critical => "critical",
        }
    }
}

impl FromStr for Severity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low"      => Ok(Severity::Low),
            "medium"   => Ok(Severity::Medium),
            "high"     => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(ValidationError::invalid_value("severity", s, "low|medium|high|critical")),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Dates carried as text
// ---------------------------------------------------------------------------

/// Parse a date-as-text field: `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

// ---------------------------------------------------------------------------
// Experiment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experiment {
    pub id: i64,
    pub compound_name: String,
    pub concentration: String, // mol/L, decimal as text
    pub temperature: String,   // °C, decimal as text
    pub conditions: Option<String>,
    pub hazard_level: HazardLevel,
    pub ai_prediction: String,
    pub recommendations: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert shape: everything but `id` and `created_at`, which the store assigns.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExperiment {
    pub compound_name: String,
    pub concentration: String,
    pub temperature: String,
    pub conditions: Option<String>,
    pub hazard_level: HazardLevel,
    pub ai_prediction: String,
    pub recommendations: Option<String>,
}

impl NewExperiment {
    pub fn into_record(self, id: i64, created_at: DateTime<Utc>) -> Experiment {
        Experiment {
            id,
            compound_name: self.compound_name,
            concentration: self.concentration,
            temperature: self.temperature,
            conditions: self.conditions,
            hazard_level: self.hazard_level,
            ai_prediction: self.ai_prediction,
            recommendations: self.recommendations,
            created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Lab note
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabNote {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub tags: Option<String>, // comma-separated
    pub created_at: DateTime<Utc>,
}

impl LabNote {
    /// Split the comma-separated tags into trimmed, non-empty chips.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Case-insensitive substring match over title, content and tags.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.content.to_lowercase().contains(&needle)
            || self.tags.as_deref().is_some_and(|t| t.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLabNote {
    pub title: String,
    pub content: String,
    pub tags: Option<String>,
}

impl NewLabNote {
    pub fn into_record(self, id: i64, created_at: DateTime<Utc>) -> LabNote {
        LabNote { id, title: self.title, content: self.content, tags: self.tags, created_at }
    }
}

// ---------------------------------------------------------------------------
// Compliance task
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceTask {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub deadline: String, // date as text
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

impl ComplianceTask {
    pub fn deadline_date(&self) -> Option<NaiveDate> {
        parse_calendar_date(&self.deadline)
    }

    /// Merge a partial update. Only `status` is mutable after creation.
    pub fn apply(&mut self, update: &TaskUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewComplianceTask {
    pub title: String,
    pub description: String,
    pub deadline: String,
    pub status: TaskStatus,
}

impl NewComplianceTask {
    pub fn into_record(self, id: i64, created_at: DateTime<Utc>) -> ComplianceTask {
        ComplianceTask {
            id,
            title: self.title,
            description: self.description,
            deadline: self.deadline,
            status: self.status,
            created_at,
        }
    }
}

/// Partial fields accepted by `PATCH /api/compliance-tasks/:id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskUpdate {
    pub status: Option<TaskStatus>,
}

// ---------------------------------------------------------------------------
// Safety report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyReport {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub incident_date: String, // date as text
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSafetyReport {
    pub title: String,
    pub content: String,
    pub incident_date: String,
    pub severity: Severity,
}

impl NewSafetyReport {
    pub fn into_record(self, id: i64, created_at: DateTime<Utc>) -> SafetyReport {
        SafetyReport {
            id,
            title: self.title,
            content: self.content,
            incident_date: self.incident_date,
            severity: self.severity,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(tags: Option<&str>) -> LabNote {
        LabNote {
            id: 1,
            title: "Titration run 1".to_string(),
            content: "Observed color change at pH 7.2".to_string(),
            tags: tags.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_hazard_level_parse_is_case_insensitive() {
        assert_eq!(" Danger ".parse::<HazardLevel>().unwrap(), HazardLevel::Danger);
        assert_eq!("CRITICAL".parse::<HazardLevel>().unwrap(), HazardLevel::Critical);
        assert!("extreme".parse::<HazardLevel>().is_err());
    }

    #[test]
    fn test_default_enums_match_column_defaults() {
        assert_eq!(HazardLevel::default(), HazardLevel::Caution);
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
        assert_eq!(Severity::default(), Severity::Low);
    }

    #[test]
    fn test_experiment_serializes_camel_case() {
        let exp = NewExperiment {
            compound_name: "Sodium Hydroxide".to_string(),
            concentration: "2.5".to_string(),
            temperature: "25".to_string(),
            conditions: None,
            hazard_level: HazardLevel::Danger,
            ai_prediction: "Corrosive.".to_string(),
            recommendations: None,
        }
        .into_record(7, Utc::now());

        let json = serde_json::to_value(&exp).unwrap();
        assert_eq!(json["compoundName"], "Sodium Hydroxide");
        assert_eq!(json["hazardLevel"], "danger");
        assert_eq!(json["aiPrediction"], "Corrosive.");
        assert!(json["recommendations"].is_null());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_tag_list_trims_and_drops_empty() {
        assert_eq!(note(Some("titration, pH,, ")).tag_list(), vec!["titration", "pH"]);
        assert!(note(None).tag_list().is_empty());
    }

    #[test]
    fn test_note_matches_any_field() {
        let n = note(Some("titration, pH"));
        assert!(n.matches("TITRATION RUN"));
        assert!(n.matches("color change"));
        assert!(n.matches("ph"));
        assert!(n.matches(""));
        assert!(!n.matches("chromatography"));
    }

    #[test]
    fn test_parse_calendar_date_formats() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(parse_calendar_date("2025-03-14"), Some(d));
        assert_eq!(parse_calendar_date("2025-03-14T09:30:00Z"), Some(d));
        assert_eq!(parse_calendar_date("next tuesday"), None);
    }

    #[test]
    fn test_task_update_only_touches_status() {
        let mut task = NewComplianceTask {
            title: "Fume hood inspection".to_string(),
            description: "Annual certification".to_string(),
            deadline: "2025-06-01".to_string(),
            status: TaskStatus::Pending,
        }
        .into_record(3, Utc::now());
        let before = task.clone();

        task.apply(&TaskUpdate { status: Some(TaskStatus::Completed) });
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(ComplianceTask { status: before.status, ..task.clone() }, before);

        task.apply(&TaskUpdate::default());
        assert_eq!(task.status, TaskStatus::Completed);
    }
}
