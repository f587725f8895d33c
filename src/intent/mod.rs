//! Intent
//!
//! Pattern-based classification of a question into an analytical shape. The
//! result is a hint for SQL generation and the dispatch key for statistics.

pub mod detector;
pub mod patterns;

pub use detector::IntentDetector;
pub use patterns::{INTENT_PRECEDENCE, KNOWN_TABLES, METRIC_FAMILIES};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentType {
    List,
    Aggregate,
    Comparison,
    Trend,
    Correlation,
    Unknown,
}

impl IntentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentType::List => "list",
            IntentType::Aggregate => "aggregate",
            IntentType::Comparison => "comparison",
            IntentType::Trend => "trend",
            IntentType::Correlation => "correlation",
            IntentType::Unknown => "unknown",
        }
    }

    /// Whether this shape gets a statistical analysis.
    pub fn requires_analysis(&self) -> bool {
        matches!(
            self,
            IntentType::Correlation | IntentType::Comparison | IntentType::Trend | IntentType::Aggregate
        )
    }
}

impl fmt::Display for IntentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detected intent of a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    #[serde(rename = "type")]
    pub intent_type: IntentType,
    pub entities: BTreeSet<String>,
    pub metrics: BTreeSet<String>,
    pub confidence: f64,
    pub analysis_required: bool,
    pub analysis_type: Option<String>,
}

impl Intent {
    /// Build an intent; `analysis_required` and `analysis_type` follow from the type.
    pub fn new(
        intent_type: IntentType,
        entities: BTreeSet<String>,
        metrics: BTreeSet<String>,
        confidence: f64,
    ) -> Self {
        let analysis_required = intent_type.requires_analysis();
        Self {
            intent_type,
            entities,
            metrics,
            confidence: confidence.clamp(0.0, 1.0),
            analysis_required,
            analysis_type: analysis_required.then(|| "statistical".to_string()),
        }
    }

    /// Intent with no entities or metrics, mostly for callers that skip detection.
    pub fn of_type(intent_type: IntentType) -> Self {
        Self::new(intent_type, BTreeSet::new(), BTreeSet::new(), 0.5)
    }

    /// Hint appended to the schema context handed to SQL generation.
    pub fn schema_hint(&self) -> String {
        let mut hint = format!("\n\nQuery Intent: {}", self.intent_type);
        if !self.entities.is_empty() {
            hint.push_str(&format!(
                "\nRelevant Entities: {}",
                self.entities.iter().cloned().collect::<Vec<_>>().join(", ")
            ));
        }
        if !self.metrics.is_empty() {
            hint.push_str(&format!(
                "\nRequested Metrics: {}",
                self.metrics.iter().cloned().collect::<Vec<_>>().join(", ")
            ));
        }
        hint
    }
}
