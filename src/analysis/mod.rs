//! Statistical analysis
//!
//! Turns a result set plus the detected intent into a quantified finding. The
//! numbers and the narrative come from code only, so the interpretation always
//! matches what was computed.

pub mod aggregate;
pub mod comparison;
pub mod correlation;
pub mod engine;
pub mod interpretation;
pub mod stats;
pub mod trend;

pub use engine::StatisticalAnalyzer;

use crate::visualization::VisualizationType;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Correlation,
    Comparison,
    Trend,
    Aggregate,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Correlation => "correlation",
            AnalysisKind::Comparison => "comparison",
            AnalysisKind::Trend => "trend",
            AnalysisKind::Aggregate => "aggregate",
        }
    }

    pub fn visualization(&self) -> VisualizationType {
        match self {
            AnalysisKind::Correlation => VisualizationType::Scatter,
            AnalysisKind::Comparison | AnalysisKind::Aggregate => VisualizationType::Bar,
            AnalysisKind::Trend => VisualizationType::Line,
        }
    }

    /// Suggestion kept when the analysis could not run.
    pub fn degraded_visualization(&self) -> VisualizationType {
        match self {
            AnalysisKind::Aggregate => VisualizationType::Table,
            other => other.visualization(),
        }
    }
}

/// Why an analysis branch could not produce a result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("need {required} numeric column(s), found {found}")]
    NotEnoughNumericColumns { required: usize, found: usize },

    #[error("need {required} usable row(s), found {found}")]
    NotEnoughRows { required: usize, found: usize },

    #[error("computation produced a non-finite value for {0}")]
    NonFinite(String),

    #[error("statistics computation failed: {0}")]
    Compute(String),
}

impl From<polars::prelude::PolarsError> for AnalysisError {
    fn from(e: polars::prelude::PolarsError) -> Self {
        AnalysisError::Compute(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    VeryWeak,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl CorrelationStrength {
    /// Band for `|r|`.
    pub fn from_coefficient(r: f64) -> Self {
        let abs = r.abs();
        if abs < 0.2 {
            CorrelationStrength::VeryWeak
        } else if abs < 0.4 {
            CorrelationStrength::Weak
        } else if abs < 0.6 {
            CorrelationStrength::Moderate
        } else if abs < 0.8 {
            CorrelationStrength::Strong
        } else {
            CorrelationStrength::VeryStrong
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationDirection {
    Positive,
    Negative,
}

impl CorrelationDirection {
    pub fn from_coefficient(r: f64) -> Self {
        if r >= 0.0 {
            CorrelationDirection::Positive
        } else {
            CorrelationDirection::Negative
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationResult {
    pub correlation_coefficient: f64,
    pub strength: CorrelationStrength,
    pub direction: CorrelationDirection,
    pub x_variable: String,
    pub y_variable: String,
    pub sample_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub group: String,
    /// `None` when the group has no numeric values.
    pub mean: Option<f64>,
    pub sum: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ComparisonResult {
    Grouped {
        groups: Vec<GroupStats>,
        highest: Option<String>,
        lowest: Option<String>,
        metric: String,
        group_by: String,
    },
    Overall {
        average: Option<f64>,
        maximum: Option<f64>,
        minimum: Option<f64>,
        metric: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendResult {
    pub direction: TrendDirection,
    pub strength: f64,
    pub metric: String,
    pub first_half_avg: f64,
    pub second_half_avg: f64,
    pub sample_size: usize,
    /// First temporal column, if the result has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_column: Option<String>,
    /// Whether the rows arrived in non-decreasing order of `time_column`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_ordered: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub count: usize,
    pub metric: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatisticalResult {
    Correlation(CorrelationResult),
    Comparison(ComparisonResult),
    Trend(TrendResult),
    Aggregate(AggregateResult),
    Empty {},
}

impl StatisticalResult {
    pub fn is_empty(&self) -> bool {
        matches!(self, StatisticalResult::Empty {})
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }
}

/// Outcome of the analysis stage for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticalFinding {
    pub has_analysis: bool,
    pub analysis_type: Option<AnalysisKind>,
    pub statistical_result: StatisticalResult,
    pub interpretation: Option<String>,
    pub visualization_type: VisualizationType,
}

impl StatisticalFinding {
    /// No analysis and nothing to chart.
    pub fn none() -> Self {
        Self::suggestion_only(VisualizationType::None)
    }

    /// No analysis, only a visualization suggestion.
    pub fn suggestion_only(visualization_type: VisualizationType) -> Self {
        Self {
            has_analysis: false,
            analysis_type: None,
            statistical_result: StatisticalResult::Empty {},
            interpretation: None,
            visualization_type,
        }
    }

    pub fn completed(kind: AnalysisKind, result: StatisticalResult, interpretation: String) -> Self {
        Self {
            has_analysis: true,
            analysis_type: Some(kind),
            statistical_result: result,
            interpretation: Some(interpretation),
            visualization_type: kind.visualization(),
        }
    }

    /// The branch ran but could not produce numbers; `reason` explains why.
    pub fn degraded(kind: AnalysisKind, reason: String) -> Self {
        Self {
            has_analysis: false,
            analysis_type: Some(kind),
            statistical_result: StatisticalResult::Empty {},
            interpretation: Some(reason),
            visualization_type: kind.degraded_visualization(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_bands() {
        assert_eq!(CorrelationStrength::from_coefficient(0.19), CorrelationStrength::VeryWeak);
        assert_eq!(CorrelationStrength::from_coefficient(-0.2), CorrelationStrength::Weak);
        assert_eq!(CorrelationStrength::from_coefficient(0.5), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::from_coefficient(-0.79), CorrelationStrength::Strong);
        assert_eq!(CorrelationStrength::from_coefficient(0.8), CorrelationStrength::VeryStrong);
        assert_eq!(CorrelationDirection::from_coefficient(0.0), CorrelationDirection::Positive);
        assert_eq!(CorrelationDirection::from_coefficient(-0.1), CorrelationDirection::Negative);
    }

    #[test]
    fn test_empty_result_serializes_as_empty_object() {
        let json = serde_json::to_value(StatisticalFinding::none()).unwrap();
        assert_eq!(json["statistical_result"], serde_json::json!({}));
        assert_eq!(json["visualization_type"], "none");
        assert_eq!(json["analysis_type"], serde_json::Value::Null);
    }
}
