//! Answers for questions that need no database access.

use super::{prompts, CallError, LanguageModel};
use crate::observability::prefix;
use std::sync::Arc;
use tracing::{error, info};

pub struct GeneralQuestionHandler {
    model: Option<Arc<dyn LanguageModel>>,
}

impl GeneralQuestionHandler {
    pub fn new(model: Option<Arc<dyn LanguageModel>>) -> Self {
        Self { model }
    }

    pub async fn answer(&self, question: &str) -> Result<String, CallError> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| CallError::Unavailable("no assistant model configured".to_string()))?;

        match model.generate(&prompts::general_answer(question)).await {
            Ok(answer) => {
                info!(
                    question = prefix(question, 100),
                    answer_length = answer.chars().count(),
                    "General question answered"
                );
                Ok(answer.trim().to_string())
            }
            Err(e) => {
                error!(question = prefix(question, 100), error = %e, "General question handling failed");
                Err(e)
            }
        }
    }
}
