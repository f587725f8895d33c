//! Pipeline controller
//!
//! sensitivity -> classification -> (general answer) -> schema -> refinement
//! -> intent -> SQL generation -> validation + sanitize -> execution
//! -> statistics -> formatting -> visualization -> chart.

use super::{OutcomeMetadata, PipelineOutcome, PipelineStep};
use crate::analysis::{StatisticalAnalyzer, StatisticalFinding};
use crate::cache::QueryCache;
use crate::config::{Settings, SqlSafetyConfig};
use crate::execution::{QueryExecutor, ResultSet};
use crate::intent::{Intent, IntentDetector};
use crate::llm::{
    fallback_response, GeneralQuestionHandler, LanguageModel, QuestionCategory, QuestionClassifier, QuestionRefiner,
    ResponseFormatter, StageAttempt,
};
use crate::localization::{professional_error_message, ErrorKind};
use crate::observability::prefix;
use crate::schema_rag::SchemaProvider;
use crate::security::{SensitivityGuard, SensitivityVerdict, SqlSecurityValidator};
use crate::sql_generation::SqlGenerator;
use crate::visualization::{
    reconcile, user_requested_analysis, ChartArtifact, ChartRenderer, ChartRequest, FormatterSuggestion,
    VisualizationDecision,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// External collaborators of the pipeline.
pub struct PipelineContext {
    pub sql_model: Arc<dyn LanguageModel>,
    /// Classification, refinement and phrasing. Without it those stages fall back.
    pub assistant_model: Option<Arc<dyn LanguageModel>>,
    pub schema: Arc<dyn SchemaProvider>,
    pub executor: Arc<dyn QueryExecutor>,
    pub sensitivity: Arc<dyn SensitivityGuard>,
    pub chart_renderer: Option<Arc<dyn ChartRenderer>>,
    pub query_cache: Option<Arc<QueryCache>>,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub top_k: usize,
    pub show_sql_to_user: bool,
    pub sql: SqlSafetyConfig,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            show_sql_to_user: true,
            sql: SqlSafetyConfig::default(),
        }
    }
}

impl PipelineOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            top_k: settings.rag_top_k,
            show_sql_to_user: settings.show_sql_to_user,
            sql: settings.sql.clone(),
        }
    }
}

pub struct Pipeline {
    context: PipelineContext,
    options: PipelineOptions,
    validator: SqlSecurityValidator,
    intent_detector: IntentDetector,
    analyzer: StatisticalAnalyzer,
    classifier: QuestionClassifier,
    general: GeneralQuestionHandler,
    refiner: QuestionRefiner,
    generator: SqlGenerator,
    formatter: ResponseFormatter,
}

impl Pipeline {
    pub fn new(context: PipelineContext, options: PipelineOptions) -> Self {
        let assistant = context.assistant_model.clone();
        Self {
            validator: SqlSecurityValidator::new(&options.sql),
            intent_detector: IntentDetector::default(),
            analyzer: StatisticalAnalyzer::new(),
            classifier: QuestionClassifier::new(assistant.clone()),
            general: GeneralQuestionHandler::new(assistant.clone()),
            refiner: QuestionRefiner::new(assistant.clone()),
            generator: SqlGenerator::new(Arc::clone(&context.sql_model)),
            formatter: ResponseFormatter::new(assistant),
            context,
            options,
        }
    }

    /// Replace the default intent detector, e.g. with a deployment's table vocabulary.
    pub fn with_intent_detector(mut self, detector: IntentDetector) -> Self {
        self.intent_detector = detector;
        self
    }

    fn visible_sql(&self, sql: &str) -> Option<String> {
        self.options.show_sql_to_user.then(|| sql.to_string())
    }

    /// Answer one question. Never returns an error: failures become a failed
    /// outcome carrying a professional message.
    pub async fn ask(&self, question: &str) -> PipelineOutcome {
        let started = Instant::now();
        let outcome = self.run(question).await;
        info!(
            question = prefix(question, 100),
            success = outcome.success,
            steps = outcome.metadata.steps.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Question processed"
        );
        outcome
    }

    async fn run(&self, question: &str) -> PipelineOutcome {
        let mut metadata = OutcomeMetadata::default();

        if let SensitivityVerdict::Blocked { reason } = self.context.sensitivity.check(question) {
            warn!(question = prefix(question, 100), "Sensitive question blocked");
            metadata.step(PipelineStep::SensitiveQuestionDetected);
            return PipelineOutcome::failed(reason, None, metadata);
        }
        metadata.step(PipelineStep::SensitiveCheckPassed);

        let classification = self.classifier.classify(question).await;
        metadata.step(PipelineStep::QuestionClassified);
        metadata.is_database_related = Some(classification.category == QuestionCategory::Database);
        metadata.classification_note = classification.note;

        if classification.category == QuestionCategory::General {
            return match self.general.answer(question).await {
                Ok(answer) => {
                    metadata.step(PipelineStep::GeneralQuestionAnswered);
                    PipelineOutcome::general_answer(answer, metadata)
                }
                Err(e) => {
                    error!(question = prefix(question, 100), stage = "general_answer", error = %e, "General question failed");
                    PipelineOutcome::failed(
                        professional_error_message(question, ErrorKind::GeneralError),
                        None,
                        metadata,
                    )
                }
            };
        }

        let full_schema = match self.context.schema.schema_context().await {
            Ok(schema) => schema,
            Err(e) => {
                warn!(stage = "schema", error = %e, "Schema context unavailable");
                String::new()
            }
        };
        metadata.step(PipelineStep::SchemaRetrieved);

        let question_to_use = match self.refiner.refine(question, &full_schema).await {
            StageAttempt::Attempted(refined) => {
                metadata.step(PipelineStep::QuestionRefined);
                metadata.original_question = Some(question.to_string());
                metadata.refined_question = Some(refined.clone());
                refined
            }
            StageAttempt::Skipped { reason } => {
                metadata.refinement_skipped = Some(reason);
                question.to_string()
            }
        };

        let intent = self.intent_detector.detect(&question_to_use);
        metadata.step(PipelineStep::IntentDetected);
        metadata.query_intent = Some(intent.clone());

        let relevant_schema = match self
            .context
            .schema
            .retrieve(&question_to_use, self.options.top_k)
            .await
        {
            Ok(schema) => schema,
            Err(e) => {
                warn!(stage = "schema_retrieval", error = %e, "Schema retrieval failed, using full schema");
                full_schema
            }
        };
        let schema_context = format!("{}{}", relevant_schema, intent.schema_hint());

        let sql = match self.generator.generate(&question_to_use, &schema_context).await {
            Ok(sql) => sql,
            Err(e) => {
                warn!(
                    question = prefix(question, 100),
                    stage = "sql_generation",
                    technical_error = %e,
                    "SQL generation failed"
                );
                return PipelineOutcome::failed(
                    professional_error_message(question, ErrorKind::SqlGeneration),
                    None,
                    metadata,
                );
            }
        };
        metadata.step(PipelineStep::SqlGenerated);

        if let Err(e) = self.validator.validate(&sql) {
            warn!(
                question = prefix(question, 100),
                sql = prefix(&sql, 200),
                stage = "sql_validation",
                technical_error = %e,
                "SQL rejected by security validator"
            );
            return PipelineOutcome::failed(
                professional_error_message(question, ErrorKind::SqlGeneration),
                self.visible_sql(&sql),
                metadata,
            );
        }
        let sql = self.validator.sanitize(&sql);
        metadata.step(PipelineStep::SqlValidated);

        let results = match self.context.executor.execute(&sql).await {
            Ok(results) => results,
            Err(e) => {
                let technical = e.to_string();
                warn!(
                    question = prefix(question, 100),
                    sql = prefix(&sql, 200),
                    stage = "sql_execution",
                    technical_error = %technical,
                    "SQL execution failed"
                );
                return PipelineOutcome::failed(
                    professional_error_message(question, ErrorKind::from_execution_error(&technical)),
                    self.visible_sql(&sql),
                    metadata,
                );
            }
        };
        metadata.step(PipelineStep::SqlExecuted);
        metadata.rows_returned = Some(results.row_count());

        let finding = self.analyzer.analyze(&results, &intent, question);
        metadata.step(PipelineStep::StatisticalAnalysis);

        let (mut answer, decision) = match self.formatter.format(question, &sql, &results, &finding).await {
            StageAttempt::Attempted(formatted) => {
                metadata.step(PipelineStep::ResponseFormatted);
                let decision = reconcile(
                    question,
                    intent.intent_type,
                    Some(FormatterSuggestion {
                        needs_visualization: formatted.needs_visualization,
                        visualization_type: &formatted.visualization_type,
                    }),
                    finding.visualization_type,
                );
                (formatted.response, decision)
            }
            StageAttempt::Skipped { reason } => {
                metadata.formatting_skipped = Some(reason);
                let fallback = fallback_response(question, &results, &finding);
                let decision = reconcile(question, intent.intent_type, None, finding.visualization_type);
                (fallback.response, decision)
            }
        };

        let chart = self.render_chart(&results, &decision, &intent, &finding, &mut metadata).await;

        if user_requested_analysis(question) && finding.has_analysis {
            if let Some(insight) = finding.interpretation.as_deref() {
                if answer != insight {
                    answer = format!("{}\n\n{}", insight, answer);
                }
            }
        }

        let query_id = self.context.query_cache.as_ref().map(|cache| {
            cache.store(
                results.clone(),
                question,
                &sql,
                Some(serde_json::json!({
                    "intent": intent.intent_type,
                    "visualization_type": decision.visualization_type,
                })),
            )
        });

        metadata.step(PipelineStep::AnswerGenerated);
        PipelineOutcome {
            success: true,
            answer: Some(answer),
            sql_query: self.visible_sql(&sql),
            data: Some(results.to_records()),
            needs_visualization: decision.needs_visualization,
            visualization_type: decision.visualization_type,
            statistical_finding: Some(finding),
            chart,
            is_database_related: true,
            query_id,
            error: None,
            metadata,
        }
    }

    /// Chart failures are logged and recorded, never fatal.
    async fn render_chart(
        &self,
        results: &ResultSet,
        decision: &VisualizationDecision,
        intent: &Intent,
        finding: &StatisticalFinding,
        metadata: &mut OutcomeMetadata,
    ) -> Option<ChartArtifact> {
        if !decision.needs_visualization || !decision.visualization_type.is_chart() {
            return None;
        }
        let renderer = self.context.chart_renderer.as_ref()?;

        let data = match results.to_dataframe() {
            Ok(df) => df,
            Err(e) => {
                warn!(error = %e, "Could not build chart data");
                metadata.chart_error = Some(e.to_string());
                return None;
            }
        };

        let request = ChartRequest {
            data,
            visualization_type: decision.visualization_type,
            intent: intent.clone(),
            statistical_result: finding.statistical_result.to_json(),
        };
        match renderer.render(request).await {
            Ok(artifact) => {
                info!(chart_type = decision.visualization_type.as_str(), locator = %artifact.locator, "Chart generated");
                metadata.step(PipelineStep::ChartGenerated);
                Some(artifact)
            }
            Err(e) => {
                warn!(visualization_type = decision.visualization_type.as_str(), error = %e, "Chart generation failed");
                metadata.chart_error = Some(e.to_string());
                None
            }
        }
    }
}
