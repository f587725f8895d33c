pub mod analysis;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod execution;
pub mod intent;
pub mod llm;
pub mod localization;
pub mod observability;
pub mod pipeline;
pub mod schema_rag;
pub mod security;
pub mod sql_generation;
pub mod visualization;

pub use analysis::{StatisticalAnalyzer, StatisticalFinding};
pub use config::Settings;
pub use error::{InsightError, Result};
pub use execution::{QueryExecutor, ResultSet, Value};
pub use intent::{Intent, IntentDetector, IntentType};
pub use pipeline::{Pipeline, PipelineContext, PipelineOptions, PipelineOutcome};
pub use security::SqlSecurityValidator;
