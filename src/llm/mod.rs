//! Language-model collaborators
//!
//! Every model call goes through the `LanguageModel` capability and can fail;
//! the stages built on it (classification, refinement, general answers,
//! response formatting) each decide what a failure means for them.

pub mod classifier;
pub mod formatter;
pub mod general;
pub mod openai;
pub mod prompts;
pub mod refiner;

pub use classifier::{Classification, QuestionCategory, QuestionClassifier};
pub use formatter::{fallback_response, DataSummary, FormattedResponse, ResponseFormatter};
pub use general::GeneralQuestionHandler;
pub use openai::OpenAiModel;
pub use refiner::QuestionRefiner;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CallError {
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("model endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("model is not available: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, CallError>;
}

/// Outcome of a best-effort stage. Callers always have a fallback for `Skipped`.
#[derive(Debug, Clone, PartialEq)]
pub enum StageAttempt<T> {
    Attempted(T),
    Skipped { reason: String },
}

impl<T> StageAttempt<T> {
    pub fn skipped(reason: impl Into<String>) -> Self {
        StageAttempt::Skipped { reason: reason.into() }
    }

    pub fn is_attempted(&self) -> bool {
        matches!(self, StageAttempt::Attempted(_))
    }

    pub fn attempted(self) -> Option<T> {
        match self {
            StageAttempt::Attempted(value) => Some(value),
            StageAttempt::Skipped { .. } => None,
        }
    }
}
