//! Group comparison of the first numeric column.

use super::interpretation;
use super::stats::{self, round_to};
use super::{AnalysisError, AnalysisKind, ComparisonResult, GroupStats, StatisticalFinding, StatisticalResult};
use crate::execution::ResultSet;
use crate::localization::Language;

pub fn analyze(results: &ResultSet, lang: Language) -> Result<StatisticalFinding, AnalysisError> {
    let metric_idx = *results
        .numeric_columns()
        .first()
        .ok_or(AnalysisError::NotEnoughNumericColumns { required: 1, found: 0 })?;
    let metric = results.columns()[metric_idx].clone();

    let (result, text) = match results.text_columns().first() {
        Some(&group_idx) => grouped(results, group_idx, metric_idx, metric, lang)?,
        None => overall(results, metric_idx, metric, lang)?,
    };

    Ok(StatisticalFinding::completed(
        AnalysisKind::Comparison,
        StatisticalResult::Comparison(result),
        text,
    ))
}

/// Per-group statistics, groups in sorted order. Rows without a text label
/// are skipped.
pub fn group_stats(results: &ResultSet, group_idx: usize, metric_idx: usize) -> Result<Vec<GroupStats>, AnalysisError> {
    let (labels, values): (Vec<Option<String>>, Vec<Option<f64>>) = results
        .rows()
        .iter()
        .map(|row| {
            (
                row.get(group_idx).and_then(|v| v.as_text()).map(str::to_string),
                row.get(metric_idx).and_then(|v| v.as_f64()),
            )
        })
        .unzip();
    stats::group_summaries(labels, values)
}

fn grouped(
    results: &ResultSet,
    group_idx: usize,
    metric_idx: usize,
    metric: String,
    lang: Language,
) -> Result<(ComparisonResult, String), AnalysisError> {
    let groups = group_stats(results, group_idx, metric_idx)?;

    // First group wins ties, as groups are already sorted.
    let mut highest: Option<usize> = None;
    let mut lowest: Option<usize> = None;
    for (idx, g) in groups.iter().enumerate() {
        let Some(mean) = g.mean else { continue };
        if highest.and_then(|h| groups[h].mean).map_or(true, |m| mean > m) {
            highest = Some(idx);
        }
        if lowest.and_then(|l| groups[l].mean).map_or(true, |m| mean < m) {
            lowest = Some(idx);
        }
    }
    let labelled = |idx: Option<usize>| idx.and_then(|i| Some((groups[i].group.as_str(), groups[i].mean?)));

    let text = interpretation::comparison_grouped(&metric, labelled(highest), labelled(lowest), lang);
    let result = ComparisonResult::Grouped {
        highest: highest.map(|i| groups[i].group.clone()),
        lowest: lowest.map(|i| groups[i].group.clone()),
        groups,
        metric,
        group_by: results.columns()[group_idx].clone(),
    };
    Ok((result, text))
}

fn overall(
    results: &ResultSet,
    metric_idx: usize,
    metric: String,
    lang: Language,
) -> Result<(ComparisonResult, String), AnalysisError> {
    let summary = stats::describe(&results.numeric_values(metric_idx))?;
    let (average, maximum, minimum) = match (summary.mean, summary.max, summary.min) {
        (Some(a), Some(mx), Some(mn)) => (a, mx, mn),
        _ => {
            return Err(AnalysisError::NotEnoughRows {
                required: 1,
                found: summary.count,
            })
        }
    };

    let text = interpretation::comparison_overall(&metric, average, maximum, minimum, lang);
    let result = ComparisonResult::Overall {
        average: Some(round_to(average, 2)),
        maximum: Some(round_to(maximum, 2)),
        minimum: Some(round_to(minimum, 2)),
        metric,
    };
    Ok((result, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::Value;
    use crate::result_set;

    #[test]
    fn test_highest_and_lowest_group() {
        let rs = result_set!(["group", "value"], ["A", 10], ["A", 10], ["B", 50]).unwrap();
        let finding = analyze(&rs, Language::English).unwrap();
        assert!(finding.has_analysis);
        match finding.statistical_result {
            StatisticalResult::Comparison(ComparisonResult::Grouped {
                highest,
                lowest,
                groups,
                group_by,
                ..
            }) => {
                assert_eq!(highest.as_deref(), Some("B"));
                assert_eq!(lowest.as_deref(), Some("A"));
                assert_eq!(group_by, "group");
                assert_eq!(groups[0].sum, 20.0);
                assert_eq!(groups[0].count, 2);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_null_group_labels_skipped() {
        let rs = result_set!(
            ["store", "amount"],
            ["1", 5.0],
            [Value::Null, 100.0],
            ["2", Value::Null],
        )
        .unwrap();
        let groups = group_stats(&rs, 0, 1).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].mean, None);
        assert_eq!(groups[1].count, 0);
    }

    #[test]
    fn test_overall_without_text_column() {
        let rs = result_set!(["amount"], [1.0], [2.5], [4.0]).unwrap();
        let finding = analyze(&rs, Language::English).unwrap();
        match finding.statistical_result {
            StatisticalResult::Comparison(ComparisonResult::Overall {
                average, maximum, minimum, ..
            }) => {
                assert_eq!(average, Some(2.5));
                assert_eq!(maximum, Some(4.0));
                assert_eq!(minimum, Some(1.0));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_requires_numeric_column() {
        let rs = result_set!(["name"], ["a"]).unwrap();
        assert!(matches!(
            analyze(&rs, Language::English),
            Err(AnalysisError::NotEnoughNumericColumns { .. })
        ));
    }
}
