//! Final record of one request.

use crate::analysis::StatisticalFinding;
use crate::intent::Intent;
use crate::visualization::{ChartArtifact, VisualizationType};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    SensitiveQuestionDetected,
    SensitiveCheckPassed,
    QuestionClassified,
    GeneralQuestionAnswered,
    SchemaRetrieved,
    QuestionRefined,
    IntentDetected,
    SqlGenerated,
    SqlValidated,
    SqlExecuted,
    StatisticalAnalysis,
    ResponseFormatted,
    ChartGenerated,
    AnswerGenerated,
}

/// Trail of what ran and why best-effort stages were skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutcomeMetadata {
    pub steps: Vec<PipelineStep>,
    pub is_database_related: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refined_question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refinement_skipped: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_intent: Option<Intent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_returned: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatting_skipped: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_error: Option<String>,
}

impl OutcomeMetadata {
    pub fn step(&mut self, step: PipelineStep) {
        self.steps.push(step);
    }

    pub fn ran(&self, step: PipelineStep) -> bool {
        self.steps.contains(&step)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutcome {
    pub success: bool,
    pub answer: Option<String>,
    /// Withheld when the deployment hides SQL from users.
    pub sql_query: Option<String>,
    pub data: Option<Vec<serde_json::Map<String, serde_json::Value>>>,
    pub needs_visualization: bool,
    pub visualization_type: VisualizationType,
    pub statistical_finding: Option<StatisticalFinding>,
    pub chart: Option<ChartArtifact>,
    pub is_database_related: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
    pub error: Option<String>,
    pub metadata: OutcomeMetadata,
}

impl PipelineOutcome {
    /// Failed request: the user-facing message is both answer and error.
    pub fn failed(message: String, sql_query: Option<String>, metadata: OutcomeMetadata) -> Self {
        Self {
            success: false,
            answer: Some(message.clone()),
            sql_query,
            data: None,
            needs_visualization: false,
            visualization_type: VisualizationType::None,
            statistical_finding: None,
            chart: None,
            is_database_related: metadata.is_database_related.unwrap_or(true),
            query_id: None,
            error: Some(message),
            metadata,
        }
    }

    pub fn general_answer(answer: String, metadata: OutcomeMetadata) -> Self {
        Self {
            success: true,
            answer: Some(answer),
            sql_query: None,
            data: None,
            needs_visualization: false,
            visualization_type: VisualizationType::None,
            statistical_finding: None,
            chart: None,
            is_database_related: false,
            query_id: None,
            error: None,
            metadata,
        }
    }
}
