//! Hazard assessment: prompt construction, one provider call, and a
//! default-filling decode of the JSON the model returns.
//!
//! Decoding never fails. Unparsable content is treated as "all fields
//! absent" and every absent field gets its default:
//!   hazardLevel     → caution
//!   analysis        → "Analysis not available"
//!   recommendations → none

use labwarden_common::{ExperimentParams, HazardLevel, NewExperiment};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::audit::LlmAuditEntry;
use crate::backend::{LlmBackend, LlmError, LlmRequest, Message, ResponseFormat};

pub const SYSTEM_PROMPT: &str =
    "You are a chemical safety expert providing hazard assessments. Always respond with valid JSON.";
pub const ANALYSIS_FALLBACK: &str = "Analysis not available";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum AssessmentError {
    /// The provider could not be reached or answered with an error.
    #[error("Hazard assessment unavailable: {0}")]
    Unavailable(#[from] LlmError),
}

/// Default-filled assessment result.
#[derive(Debug, Clone, PartialEq)]
pub struct HazardAssessment {
    pub hazard_level: HazardLevel,
    pub analysis: String,
    pub recommendations: Option<String>,
}

impl HazardAssessment {
    /// Combine with the validated parameters into a storable experiment.
    pub fn into_new_experiment(self, params: ExperimentParams) -> NewExperiment {
        NewExperiment {
            compound_name: params.compound_name,
            concentration: params.concentration,
            temperature: params.temperature,
            conditions: params.conditions,
            hazard_level: self.hazard_level,
            ai_prediction: self.analysis,
            recommendations: self.recommendations,
        }
    }
}

// ── Decode ───────────────────────────────────────────────────────────────────

/// A mistyped field (e.g. `"analysis": 42`) decodes as absent.
fn lenient_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(de)?;
    Ok(value.as_str().map(str::to_string))
}

/// What the model sent, before defaults.
#[derive(Debug, Default, Deserialize)]
struct PartialAssessment {
    #[serde(default, rename = "hazardLevel", deserialize_with = "lenient_string")]
    hazard_level: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    analysis: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    recommendations: Option<String>,
}

impl PartialAssessment {
    fn decode(content: &str) -> Self {
        let content = content.trim();
        if let Ok(partial) = serde_json::from_str::<PartialAssessment>(content) {
            return partial;
        }
        // Some providers wrap the object in prose or a code fence.
        if let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) {
            if start < end {
                if let Ok(partial) = serde_json::from_str::<PartialAssessment>(&content[start..=end]) {
                    return partial;
                }
            }
        }
        if !content.is_empty() {
            tracing::warn!(len = content.len(), "assessment content is not a JSON object; using defaults");
        }
        PartialAssessment::default()
    }

    fn fill_defaults(self) -> HazardAssessment {
        let hazard_level = match self.hazard_level.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw.parse::<HazardLevel>().unwrap_or_else(|_| {
                tracing::warn!(hazard_level = raw, "unknown hazard level from provider; using caution");
                HazardLevel::default()
            }),
            _ => HazardLevel::default(),
        };
        let non_empty = |s: Option<String>| s.filter(|v| !v.trim().is_empty());

        HazardAssessment {
            hazard_level,
            analysis: non_empty(self.analysis).unwrap_or_else(|| ANALYSIS_FALLBACK.to_string()),
            recommendations: non_empty(self.recommendations),
        }
    }
}

/// Decode a completion into an assessment, substituting defaults for absent fields.
pub fn parse_assessment(content: &str) -> HazardAssessment {
    PartialAssessment::decode(content).fill_defaults()
}

// ── Prompt ───────────────────────────────────────────────────────────────────

pub fn build_prompt(params: &ExperimentParams) -> String {
    let conditions = params
        .conditions
        .as_deref()
        .map(|c| format!("Conditions: {c}\n"))
        .unwrap_or_default();

    format!(
        r#"You are a chemical safety expert. Analyze the following chemical compound and experimental conditions, then provide a comprehensive hazard assessment.

Compound: {compound}
Concentration: {concentration} mol/L
Temperature: {temperature}°C
{conditions}
Provide a JSON response with the following structure:
{{
  "hazardLevel": "safe" | "caution" | "danger" | "critical",
  "analysis": "A detailed analysis of the chemical hazards including toxicity, flammability, and reactivity concerns (2-3 sentences)",
  "recommendations": "Specific safety recommendations and required PPE (2-3 sentences)"
}}

Criteria for hazard levels:
- safe: Low risk, standard lab safety sufficient
- caution: Moderate risk, requires enhanced safety measures
- danger: High risk, requires strict safety protocols and specialized PPE
- critical: Extreme risk, requires maximum safety protocols and emergency preparedness"#,
        compound = params.compound_name,
        concentration = params.concentration,
        temperature = params.temperature,
    )
}

// ── Assessor ─────────────────────────────────────────────────────────────────

/// Wraps a single provider call per assessment. No memoization: identical
/// parameters re-invoke the provider every time.
#[derive(Clone)]
pub struct HazardAssessor {
    backend: Arc<dyn LlmBackend>,
    model: Option<String>,
    temperature: f32,
}

impl HazardAssessor {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend, model: None, temperature: DEFAULT_TEMPERATURE }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model_id(&self) -> &str {
        self.model.as_deref().unwrap_or_else(|| self.backend.model_id())
    }

    pub fn build_request(&self, params: &ExperimentParams) -> LlmRequest {
        LlmRequest {
            messages: vec![Message::system(SYSTEM_PROMPT), Message::user(build_prompt(params))],
            model: self.model.clone(),
            max_tokens: None,
            temperature: Some(self.temperature),
            response_format: Some(ResponseFormat::JsonObject),
        }
    }

    pub async fn assess(&self, params: &ExperimentParams) -> Result<HazardAssessment, AssessmentError> {
        let req = self.build_request(params);
        let started = Instant::now();

        let resp = self.backend.complete(req).await.map_err(|e| {
            tracing::warn!(compound = %params.compound_name, error = %e, "hazard assessment call failed");
            AssessmentError::Unavailable(e)
        })?;

        LlmAuditEntry::new(
            &params.compound_name,
            resp.model.clone(),
            self.backend.is_local(),
            resp.prompt_tokens,
            resp.completion_tokens,
            &resp.content,
            started.elapsed().as_millis() as u64,
        )
        .emit();

        let assessment = parse_assessment(&resp.content);
        tracing::info!(
            compound = %params.compound_name,
            hazard_level = %assessment.hazard_level,
            "hazard assessed"
        );
        Ok(assessment)
    }
}
