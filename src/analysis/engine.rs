//! Analysis dispatch
//!
//! Routes a result set to the branch named by the intent and turns a branch
//! failure into a degraded finding. Nothing here returns an error.

use super::{aggregate, comparison, correlation, interpretation, trend};
use super::{AnalysisKind, StatisticalFinding};
use crate::execution::ResultSet;
use crate::intent::{Intent, IntentType};
use crate::localization::Language;
use crate::observability::prefix;
use crate::visualization::VisualizationType;
use tracing::{info, warn};

#[derive(Debug, Default, Clone, Copy)]
pub struct StatisticalAnalyzer;

impl StatisticalAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, results: &ResultSet, intent: &Intent, question: &str) -> StatisticalFinding {
        if results.is_empty() {
            return StatisticalFinding::none();
        }

        let lang = Language::detect(question);
        let (kind, outcome) = match intent.intent_type {
            IntentType::Correlation => (
                AnalysisKind::Correlation,
                correlation::analyze(results, &intent.metrics, lang),
            ),
            IntentType::Comparison => (AnalysisKind::Comparison, comparison::analyze(results, lang)),
            IntentType::Trend => (AnalysisKind::Trend, trend::analyze(results, lang)),
            IntentType::Aggregate => (AnalysisKind::Aggregate, aggregate::analyze(results, lang)),
            IntentType::List | IntentType::Unknown => {
                return StatisticalFinding::suggestion_only(suggest_visualization(results));
            }
        };

        match outcome {
            Ok(finding) => {
                info!(
                    analysis_type = kind.as_str(),
                    rows = results.row_count(),
                    visualization_type = %finding.visualization_type,
                    "Statistical analysis completed"
                );
                finding
            }
            Err(e) => {
                warn!(
                    analysis_type = kind.as_str(),
                    question = prefix(question, 100),
                    error = %e,
                    "Statistical analysis skipped"
                );
                StatisticalFinding::degraded(kind, interpretation::degraded(kind, &e, lang))
            }
        }
    }
}

/// Chart suggestion for results that get no analysis.
pub fn suggest_visualization(results: &ResultSet) -> VisualizationType {
    let numeric = results.numeric_columns().len();
    let categorical = results.text_columns().len();
    if categorical > 0 && numeric > 0 {
        VisualizationType::Bar
    } else if numeric >= 2 {
        VisualizationType::Scatter
    } else {
        VisualizationType::Table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{
        ComparisonResult, CorrelationDirection, CorrelationStrength, StatisticalResult, TrendDirection,
    };
    use crate::execution::Value;
    use crate::result_set;

    const ALL_TYPES: [IntentType; 6] = [
        IntentType::List,
        IntentType::Aggregate,
        IntentType::Comparison,
        IntentType::Trend,
        IntentType::Correlation,
        IntentType::Unknown,
    ];

    fn analyze(rs: &ResultSet, t: IntentType) -> StatisticalFinding {
        StatisticalAnalyzer::new().analyze(rs, &Intent::of_type(t), "question")
    }

    #[test]
    fn test_empty_results_never_analyzed() {
        for t in ALL_TYPES {
            let finding = analyze(&ResultSet::empty(), t);
            assert!(!finding.has_analysis);
            assert_eq!(finding.visualization_type, VisualizationType::None);
        }
    }

    #[test]
    fn test_correlation_y_equals_2x() {
        let rows: Vec<Vec<Value>> = (1..=10).map(|x| vec![Value::Int(x), Value::Int(2 * x)]).collect();
        let rs = ResultSet::new(vec!["x".into(), "y".into()], rows).unwrap();
        let finding = analyze(&rs, IntentType::Correlation);

        assert!(finding.has_analysis);
        assert_eq!(finding.visualization_type, VisualizationType::Scatter);
        match finding.statistical_result {
            StatisticalResult::Correlation(c) => {
                assert!((c.correlation_coefficient - 1.0).abs() < 1e-9);
                assert_eq!(c.strength, CorrelationStrength::VeryStrong);
                assert_eq!(c.direction, CorrelationDirection::Positive);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_comparison_groups() {
        let rs = result_set!(["group", "value"], ["A", 10], ["A", 10], ["B", 50]).unwrap();
        let finding = analyze(&rs, IntentType::Comparison);
        assert_eq!(finding.visualization_type, VisualizationType::Bar);
        match finding.statistical_result {
            StatisticalResult::Comparison(ComparisonResult::Grouped { highest, lowest, .. }) => {
                assert_eq!(highest.as_deref(), Some("B"));
                assert_eq!(lowest.as_deref(), Some("A"));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_trend_directions() {
        let inc = ResultSet::new(vec!["v".into()], (1..=6).map(|v| vec![Value::Int(v)]).collect()).unwrap();
        let dec = ResultSet::new(vec!["v".into()], (1..=6).rev().map(|v| vec![Value::Int(v)]).collect()).unwrap();

        for (rs, expected) in [(inc, TrendDirection::Increasing), (dec, TrendDirection::Decreasing)] {
            let finding = analyze(&rs, IntentType::Trend);
            assert_eq!(finding.visualization_type, VisualizationType::Line);
            match finding.statistical_result {
                StatisticalResult::Trend(t) => assert_eq!(t.direction, expected),
                other => panic!("unexpected result {:?}", other),
            }
        }
    }

    #[test]
    fn test_aggregate_summary() {
        let rs = result_set!(["n"], [1], [2], [3], [4], [5]).unwrap();
        let finding = analyze(&rs, IntentType::Aggregate);
        assert_eq!(finding.visualization_type, VisualizationType::Bar);
        let json = finding.statistical_result.to_json();
        assert_eq!(json["mean"], 3.0);
        assert_eq!(json["median"], 3.0);
        assert_eq!(json["min"], 1.0);
        assert_eq!(json["max"], 5.0);
        assert_eq!(json["count"], 5);
    }

    #[test]
    fn test_branch_failure_degrades() {
        let rs = result_set!(["name"], ["Action"], ["Drama"]).unwrap();

        let finding = analyze(&rs, IntentType::Correlation);
        assert!(!finding.has_analysis);
        assert_eq!(finding.analysis_type, Some(AnalysisKind::Correlation));
        assert_eq!(finding.visualization_type, VisualizationType::Scatter);
        assert!(finding.interpretation.is_some());

        let finding = analyze(&rs, IntentType::Aggregate);
        assert!(!finding.has_analysis);
        assert_eq!(finding.visualization_type, VisualizationType::Table);
    }

    #[test]
    fn test_list_suggestions() {
        let bar = result_set!(["name", "count"], ["Action", 64]).unwrap();
        let scatter = result_set!(["length", "rate"], [90, 0.99]).unwrap();
        let table = result_set!(["name"], ["Action"]).unwrap();

        for t in [IntentType::List, IntentType::Unknown] {
            assert_eq!(analyze(&bar, t).visualization_type, VisualizationType::Bar);
            assert_eq!(analyze(&scatter, t).visualization_type, VisualizationType::Scatter);
            assert_eq!(analyze(&table, t).visualization_type, VisualizationType::Table);
            assert!(!analyze(&bar, t).has_analysis);
        }
    }

    #[test]
    fn test_interpretation_language_follows_question() {
        let rs = result_set!(["n"], [1], [2], [3]).unwrap();
        let intent = Intent::of_type(IntentType::Aggregate);
        let ar = StatisticalAnalyzer::new().analyze(&rs, &intent, "ما هو متوسط السعر؟");
        assert!(ar.interpretation.unwrap().starts_with("إحصائيات"));
        let en = StatisticalAnalyzer::new().analyze(&rs, &intent, "What is the average price?");
        assert!(en.interpretation.unwrap().starts_with("Statistics"));
    }
}
