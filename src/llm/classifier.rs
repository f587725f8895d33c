//! Question classification: database question or general knowledge.

use super::{prompts, LanguageModel};
use crate::observability::prefix;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    Database,
    General,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category: QuestionCategory,
    /// Set when the category is a default rather than the model's answer.
    pub note: Option<String>,
}

const DATABASE_INDICATORS: &[&str] = &["database", "db", "data query", "query data", "retrieve data", "requires database"];
const GENERAL_INDICATORS: &[&str] = &["general", "concept", "explain", "theory", "definition", "conceptual"];

pub struct QuestionClassifier {
    model: Option<Arc<dyn LanguageModel>>,
}

impl QuestionClassifier {
    pub fn new(model: Option<Arc<dyn LanguageModel>>) -> Self {
        Self { model }
    }

    /// Never fails: without a usable model reply the question counts as a database question.
    pub async fn classify(&self, question: &str) -> Classification {
        let Some(model) = &self.model else {
            return Classification {
                category: QuestionCategory::Database,
                note: Some("No classification model configured, defaulting to database".to_string()),
            };
        };

        match model.generate(&prompts::classification(question)).await {
            Ok(reply) => {
                let category = parse_classification(&reply);
                info!(
                    question = prefix(question, 100),
                    category = ?category,
                    reply = prefix(&reply, 50),
                    "Question classified"
                );
                Classification { category, note: None }
            }
            Err(e) => {
                error!(question = prefix(question, 100), error = %e, "Question classification failed");
                Classification {
                    category: QuestionCategory::Database,
                    note: Some(format!("Classification failed, defaulting to database: {}", e)),
                }
            }
        }
    }
}

/// Count indicator words; ties go to the first word, then to database.
pub fn parse_classification(reply: &str) -> QuestionCategory {
    let text = reply
        .to_lowercase()
        .replace("the answer is", "")
        .replace("classification:", "");
    let text = text.trim();

    let db = DATABASE_INDICATORS.iter().filter(|i| text.contains(*i)).count();
    let general = GENERAL_INDICATORS.iter().filter(|i| text.contains(*i)).count();

    if db > general {
        return QuestionCategory::Database;
    }
    if general > db {
        return QuestionCategory::General;
    }
    let first = text
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_matches(|c: char| !c.is_alphanumeric());
    match first {
        "general" => QuestionCategory::General,
        _ => QuestionCategory::Database,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CallError, ChatMessage};
    use async_trait::async_trait;

    struct Reply(Result<String, CallError>);

    #[async_trait]
    impl LanguageModel for Reply {
        async fn generate(&self, _messages: &[ChatMessage]) -> Result<String, CallError> {
            self.0.clone()
        }
    }

    #[test]
    fn test_parse_replies() {
        assert_eq!(parse_classification("database"), QuestionCategory::Database);
        assert_eq!(parse_classification("General"), QuestionCategory::General);
        assert_eq!(parse_classification("Classification: general."), QuestionCategory::General);
        assert_eq!(parse_classification("This is a conceptual question"), QuestionCategory::General);
        assert_eq!(parse_classification("no idea"), QuestionCategory::Database);
        assert_eq!(parse_classification(""), QuestionCategory::Database);
    }

    #[tokio::test]
    async fn test_model_failure_defaults_to_database() {
        let classifier = QuestionClassifier::new(Some(Arc::new(Reply(Err(CallError::EmptyResponse)))));
        let c = classifier.classify("what is a join?").await;
        assert_eq!(c.category, QuestionCategory::Database);
        assert!(c.note.is_some());
    }

    #[tokio::test]
    async fn test_no_model_defaults_to_database() {
        let c = QuestionClassifier::new(None).classify("anything").await;
        assert_eq!(c.category, QuestionCategory::Database);
    }

    #[tokio::test]
    async fn test_model_reply_used() {
        let classifier = QuestionClassifier::new(Some(Arc::new(Reply(Ok("general".into())))));
        let c = classifier.classify("what is a join?").await;
        assert_eq!(c.category, QuestionCategory::General);
        assert!(c.note.is_none());
    }
}
