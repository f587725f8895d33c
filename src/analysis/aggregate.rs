//! Summary statistics of the first numeric column.

use super::interpretation;
use super::stats::{self, round_to};
use super::{AggregateResult, AnalysisError, AnalysisKind, StatisticalFinding, StatisticalResult};
use crate::execution::ResultSet;
use crate::localization::Language;

pub fn analyze(results: &ResultSet, lang: Language) -> Result<StatisticalFinding, AnalysisError> {
    let metric_idx = *results
        .numeric_columns()
        .first()
        .ok_or(AnalysisError::NotEnoughNumericColumns { required: 1, found: 0 })?;

    // Non-finite cells never make it out of `numeric_values`.
    let summary = stats::describe(&results.numeric_values(metric_idx))?;
    let rounded = |v: Option<f64>| v.and_then(|x| stats::finite(round_to(x, 2)));

    let result = AggregateResult {
        mean: rounded(summary.mean),
        median: rounded(summary.median),
        std: rounded(summary.std),
        min: rounded(summary.min),
        max: rounded(summary.max),
        count: summary.count,
        metric: results.columns()[metric_idx].clone(),
    };
    let text = interpretation::aggregate(&result, lang);

    Ok(StatisticalFinding::completed(
        AnalysisKind::Aggregate,
        StatisticalResult::Aggregate(result),
        text,
    ))
}
