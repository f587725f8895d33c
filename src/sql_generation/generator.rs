//! Model-backed SQL generation.

use super::{check_completeness, extract_sql, GenerationError};
use crate::llm::{prompts, LanguageModel};
use crate::observability::prefix;
use std::sync::Arc;
use tracing::{info, warn};

pub struct SqlGenerator {
    model: Arc<dyn LanguageModel>,
}

impl SqlGenerator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Ask the model for a statement and return it only if it is extractable
    /// and structurally complete. No retries.
    pub async fn generate(&self, question: &str, schema_context: &str) -> Result<String, GenerationError> {
        let reply = self
            .model
            .generate(&prompts::sql_generation(schema_context, question))
            .await
            .map_err(|e| {
                warn!(question = prefix(question, 100), error = %e, "SQL generation call failed");
                GenerationError::from(e)
            })?;

        let sql = extract_sql(&reply).ok_or_else(|| {
            warn!(
                question = prefix(question, 100),
                reply = prefix(&reply, 200),
                "Could not extract SQL from model reply"
            );
            GenerationError::Extraction
        })?;

        if let Some(reason) = check_completeness(&sql) {
            warn!(sql = prefix(&sql, 200), reason, "Generated SQL is incomplete");
            return Err(GenerationError::Incomplete(reason.to_string()));
        }

        info!(question = prefix(question, 100), sql = prefix(&sql, 200), "SQL generated");
        Ok(sql)
    }
}
