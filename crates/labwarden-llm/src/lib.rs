//! labwarden-llm: Hazard assessment over an external chat-completion provider.
//! Implements the LlmBackend trait (OpenAI-style providers) and the
//! HazardAssessor that turns experiment parameters into a hazard level.

pub mod backend;
pub mod hazard;
pub mod audit;

pub use backend::{LlmBackend, LlmError, LlmRequest, LlmResponse, Message, ResponseFormat};
pub use hazard::{AssessmentError, HazardAssessment, HazardAssessor};
