//! Question refinement
//!
//! Rewrites the question against the full schema before SQL generation. Best
//! effort: any failure leaves the caller with the original question.

use super::{prompts, LanguageModel, StageAttempt};
use crate::observability::prefix;
use std::sync::Arc;
use tracing::{info, warn};

const REPLY_PREFIXES: &[&str] = &[
    "refined question:",
    "improved question:",
    "here's the refined question:",
    "the refined question is:",
];

const QUESTION_MARKERS: &[&str] = &["?", "what", "how", "show", "list", "find", "get", "كم", "ما", "ماذا"];

pub struct QuestionRefiner {
    model: Option<Arc<dyn LanguageModel>>,
}

impl QuestionRefiner {
    pub fn new(model: Option<Arc<dyn LanguageModel>>) -> Self {
        Self { model }
    }

    pub async fn refine(&self, question: &str, schema_context: &str) -> StageAttempt<String> {
        let Some(model) = &self.model else {
            return StageAttempt::skipped("no assistant model configured");
        };

        match model.generate(&prompts::refinement(schema_context, question)).await {
            Ok(reply) => {
                let refined = clean_refined(&reply);
                if refined.is_empty() {
                    warn!(question = prefix(question, 100), "Refinement reply was empty after cleanup");
                    return StageAttempt::skipped("empty refinement");
                }
                info!(
                    original = prefix(question, 100),
                    refined = prefix(&refined, 100),
                    "Question refined"
                );
                StageAttempt::Attempted(refined)
            }
            Err(e) => {
                warn!(question = prefix(question, 100), error = %e, "Question refinement failed, using original");
                StageAttempt::skipped(format!("refinement failed: {}", e))
            }
        }
    }
}

/// Strip known lead-ins and wrapping quotes; keep only the first line when it
/// reads like the question itself.
pub fn clean_refined(reply: &str) -> String {
    let mut text = reply.trim();
    for p in REPLY_PREFIXES {
        if text.len() >= p.len() && text.is_char_boundary(p.len()) && text[..p.len()].eq_ignore_ascii_case(p) {
            text = text[p.len()..].trim();
        }
    }

    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            text = &text[1..text.len() - 1];
        }
    }

    let mut lines = text.lines();
    if let (Some(first), Some(_)) = (lines.next(), lines.next()) {
        let first = first.trim();
        let lowered = first.to_lowercase();
        if QUESTION_MARKERS.iter().any(|m| lowered.contains(m)) {
            text = first;
        }
    }
    text.trim().to_string()
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
    fn test_clean_prefix_and_quotes() {
        assert_eq!(
            clean_refined("Refined question: \"List all film categories.\""),
            "List all film categories."
        );
        assert_eq!(clean_refined("'Count films per category'"), "Count films per category");
    }

    #[test]
    fn test_clean_keeps_first_question_line() {
        let reply = "List items ordered by total sales.\nThis rewrite keeps the intent.";
        assert_eq!(clean_refined(reply), "List items ordered by total sales.");

        let reply = "Revenue per store.\nSecond line";
        assert_eq!(clean_refined(reply), "Revenue per store.\nSecond line");
    }

    #[tokio::test]
    async fn test_refine_outcomes() {
        let ok = QuestionRefiner::new(Some(Arc::new(Reply(Ok("Refined question: Count films".into())))));
        assert_eq!(
            ok.refine("كم فيلم", "schema").await,
            StageAttempt::Attempted("Count films".to_string())
        );

        let failing = QuestionRefiner::new(Some(Arc::new(Reply(Err(CallError::Timeout(
            std::time::Duration::from_secs(1),
        ))))));
        assert!(!failing.refine("q", "schema").await.is_attempted());

        assert!(!QuestionRefiner::new(None).refine("q", "schema").await.is_attempted());
    }
}
