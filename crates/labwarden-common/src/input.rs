//! Request bodies for the creation endpoints and their validation.
//!
//! Every body deserializes into optional fields first; `validate()` then checks
//! the fixed required-field set for the entity. Unknown fields are ignored.

use serde::Deserialize;

use crate::error::ValidationError;
use crate::records::{
    parse_calendar_date, NewComplianceTask, NewLabNote, NewSafetyReport, Severity, TaskStatus,
    TaskUpdate,
};

/// A decimal that clients may send either as a JSON string or a JSON number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DecimalText {
    Text(String),
    Number(serde_json::Number),
}

impl DecimalText {
    fn into_text(self) -> String {
        match self {
            DecimalText::Text(s) => s.trim().to_string(),
            DecimalText::Number(n) => n.to_string(),
        }
    }
}

fn required_text(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ValidationError::Missing(field)),
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_decimal(field: &'static str, value: Option<DecimalText>) -> Result<String, ValidationError> {
    let text = value.map(DecimalText::into_text).unwrap_or_default();
    if text.is_empty() {
        return Err(ValidationError::Missing(field));
    }
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(text),
        _ => Err(ValidationError::NotANumber { field, value: text }),
    }
}

fn required_date(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    let text = required_text(field, value)?;
    if parse_calendar_date(&text).is_none() {
        return Err(ValidationError::InvalidDate { field, value: text });
    }
    Ok(text)
}

// ── Experiment ──────────────────────────────────────────────────────────────

/// Body of `POST /api/experiments/predict`. Hazard fields are server-computed
/// and therefore not part of the accepted shape.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentInput {
    pub compound_name: Option<String>,
    pub concentration: Option<DecimalText>,
    pub temperature: Option<DecimalText>,
    pub conditions: Option<String>,
}

/// Validated experiment parameters, ready to be sent for assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentParams {
    pub compound_name: String,
    pub concentration: String,
    pub temperature: String,
    pub conditions: Option<String>,
}

impl ExperimentInput {
    pub fn validate(self) -> Result<ExperimentParams, ValidationError> {
        Ok(ExperimentParams {
            compound_name: required_text("compoundName", self.compound_name)?,
            concentration: required_decimal("concentration", self.concentration)?,
            temperature: required_decimal("temperature", self.temperature)?,
            conditions: optional_text(self.conditions),
        })
    }
}

// ── Lab note ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabNoteInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<String>,
}

impl LabNoteInput {
    pub fn validate(self) -> Result<NewLabNote, ValidationError> {
        Ok(NewLabNote {
            title: required_text("title", self.title)?,
            content: required_text("content", self.content)?,
            tags: optional_text(self.tags),
        })
    }
}

// ── Compliance task ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceTaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<String>,
    pub status: Option<String>,
}

impl ComplianceTaskInput {
    pub fn validate(self) -> Result<NewComplianceTask, ValidationError> {
        let title = required_text("title", self.title)?;
        let description = required_text("description", self.description)?;
        let deadline = required_date("deadline", self.deadline)?;
        let status = match optional_text(self.status) {
            Some(s) => s.parse::<TaskStatus>()?,
            None => TaskStatus::default(),
        };
        Ok(NewComplianceTask { title, description, deadline, status })
    }
}

/// Body of `PATCH /api/compliance-tasks/:id`. Anything but `status` is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdateInput {
    pub status: Option<String>,
}

impl TaskUpdateInput {
    pub fn validate(self) -> Result<TaskUpdate, ValidationError> {
        let status = self.status.map(|s| s.parse::<TaskStatus>()).transpose()?;
        Ok(TaskUpdate { status })
    }
}

// ── Safety report ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyReportInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub incident_date: Option<String>,
    pub severity: Option<String>,
}

impl SafetyReportInput {
    pub fn validate(self) -> Result<NewSafetyReport, ValidationError> {
        let title = required_text("title", self.title)?;
        let content = required_text("content", self.content)?;
        let incident_date = required_date("incidentDate", self.incident_date)?;
        let severity = match optional_text(self.severity) {
            Some(s) => s.parse::<Severity>()?,
            None => Severity::default(),
        };
        Ok(NewSafetyReport { title, content, incident_date, severity })
    }
}
