//! Visualization
//!
//! Chart-type vocabulary, the keyword tables that detect explicit chart or
//! analysis requests, and the reconciliation between the response formatter's
//! suggestion and the statistics engine's.

pub mod renderer;

pub use renderer::{ChartArtifact, ChartRenderer, ChartRequest, RenderError};

use crate::intent::IntentType;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationType {
    Scatter,
    Bar,
    Line,
    Table,
    None,
}

impl VisualizationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisualizationType::Scatter => "scatter",
            VisualizationType::Bar => "bar",
            VisualizationType::Line => "line",
            VisualizationType::Table => "table",
            VisualizationType::None => "none",
        }
    }

    /// Concrete type names only; generic words like "chart" give `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "scatter" => Some(VisualizationType::Scatter),
            "bar" => Some(VisualizationType::Bar),
            "line" => Some(VisualizationType::Line),
            "table" => Some(VisualizationType::Table),
            "none" => Some(VisualizationType::None),
            _ => None,
        }
    }

    /// Whether a renderer has anything to draw.
    pub fn is_chart(&self) -> bool {
        matches!(
            self,
            VisualizationType::Scatter | VisualizationType::Bar | VisualizationType::Line
        )
    }
}

impl fmt::Display for VisualizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phrases that mean the user explicitly wants a chart.
pub const CHART_REQUEST_KEYWORDS: &[&str] = &["رسم بياني", "مخطط", "chart", "graph", "visualize", "plot"];

/// Wider set used when no formatter reply is available.
pub const VISUAL_HINT_KEYWORDS: &[&str] = &[
    "رسم", "مخطط", "رسم بياني", "chart", "graph", "plot", "visualize", "diagram",
];

/// Phrases that mean the user asked for analysis, so the statistical
/// interpretation belongs in the answer.
pub const ANALYSIS_REQUEST_KEYWORDS: &[&str] = &[
    "تحليل", "إحصائ", "احصائ", "مقارنة", "اتجاه", "ترند", "ارتباط", "علاقة", "رسم", "مخطط", "رسم بياني",
    "بياني", "visual", "analysis", "statistics", "statistical", "compare", "comparison", "trend",
    "correlation", "chart", "graph", "plot", "visualize", "visualisation", "visualization",
];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    keywords.iter().any(|k| lowered.contains(k))
}

pub fn user_requested_chart(question: &str) -> bool {
    contains_any(question, CHART_REQUEST_KEYWORDS)
}

pub fn mentions_visual(text: &str) -> bool {
    contains_any(text, VISUAL_HINT_KEYWORDS)
}

pub fn user_requested_analysis(question: &str) -> bool {
    contains_any(question, ANALYSIS_REQUEST_KEYWORDS)
}

/// Concrete chart for a generic "chart"/"graph" request.
pub fn resolve_generic(intent_type: IntentType, question: &str) -> VisualizationType {
    let lowered = question.to_lowercase();
    match intent_type {
        IntentType::Aggregate | IntentType::Comparison => VisualizationType::Bar,
        _ if lowered.contains("top") || lowered.contains("أعلى") => VisualizationType::Bar,
        IntentType::Trend => VisualizationType::Line,
        _ => VisualizationType::Bar,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisualizationDecision {
    pub needs_visualization: bool,
    pub visualization_type: VisualizationType,
}

/// What the response formatter said about visualization, if it ran.
#[derive(Debug, Clone, Copy)]
pub struct FormatterSuggestion<'a> {
    pub needs_visualization: bool,
    pub visualization_type: &'a str,
}

/// Settle on one visualization.
///
/// The statistics engine's type wins whenever it is not `none`. Without a
/// formatter reply, need is inferred from visual keywords in the question. An
/// explicit chart request always forces `needs_visualization`, and a forced or
/// needed visualization without a concrete chart type gets one from the intent.
pub fn reconcile(
    question: &str,
    intent_type: IntentType,
    formatter: Option<FormatterSuggestion<'_>>,
    engine_suggestion: VisualizationType,
) -> VisualizationDecision {
    let (mut needs, requested) = match formatter {
        Some(s) => (s.needs_visualization, VisualizationType::parse(s.visualization_type)),
        None => (mentions_visual(question), None),
    };

    let mut chosen = if engine_suggestion != VisualizationType::None {
        Some(engine_suggestion)
    } else {
        requested
    };

    if user_requested_chart(question) {
        needs = true;
        if !chosen.map_or(false, |t| t.is_chart()) {
            chosen = Some(resolve_generic(intent_type, question));
        }
    }

    let visualization_type = match chosen {
        Some(t) if t != VisualizationType::None => t,
        _ if needs => resolve_generic(intent_type, question),
        _ => VisualizationType::None,
    };

    VisualizationDecision {
        needs_visualization: needs,
        visualization_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(needs: bool, t: &str) -> Option<FormatterSuggestion<'_>> {
        Some(FormatterSuggestion {
            needs_visualization: needs,
            visualization_type: t,
        })
    }

    #[test]
    fn test_engine_suggestion_wins() {
        let d = reconcile("revenue over time", IntentType::Trend, suggestion(true, "bar"), VisualizationType::Line);
        assert_eq!(d.visualization_type, VisualizationType::Line);
        assert!(d.needs_visualization);
    }

    #[test]
    fn test_formatter_type_used_when_engine_has_none() {
        let d = reconcile("show films", IntentType::List, suggestion(true, "scatter"), VisualizationType::None);
        assert_eq!(d.visualization_type, VisualizationType::Scatter);
    }

    #[test]
    fn test_generic_chart_resolved_by_intent() {
        let d = reconcile("payments", IntentType::Trend, suggestion(true, "chart"), VisualizationType::None);
        assert_eq!(d.visualization_type, VisualizationType::Line);
        let d = reconcile("top customers", IntentType::List, suggestion(true, "graph"), VisualizationType::None);
        assert_eq!(d.visualization_type, VisualizationType::Bar);
    }

    #[test]
    fn test_explicit_request_forces_visualization() {
        let d = reconcile(
            "show a chart of films per category",
            IntentType::List,
            suggestion(false, "none"),
            VisualizationType::Table,
        );
        assert!(d.needs_visualization);
        assert_eq!(d.visualization_type, VisualizationType::Bar);

        let d = reconcile("ارسم مخطط للإيرادات", IntentType::Trend, None, VisualizationType::Line);
        assert!(d.needs_visualization);
        assert_eq!(d.visualization_type, VisualizationType::Line);
    }

    #[test]
    fn test_no_visualization() {
        let d = reconcile("list categories", IntentType::List, suggestion(false, "none"), VisualizationType::None);
        assert!(!d.needs_visualization);
        assert_eq!(d.visualization_type, VisualizationType::None);
    }

    #[test]
    fn test_analysis_request_keywords() {
        assert!(user_requested_analysis("Compare revenue by store"));
        assert!(user_requested_analysis("تحليل الإيرادات"));
        assert!(!user_requested_analysis("list all actors"));
    }

    #[test]
    fn test_parse() {
        assert_eq!(VisualizationType::parse(" Bar "), Some(VisualizationType::Bar));
        assert_eq!(VisualizationType::parse("chart"), None);
    }
}
