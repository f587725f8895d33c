//! Half-over-half trend of the first numeric column.
//!
//! Rows are taken in the order the database returned them; nothing here
//! sorts by time. When a temporal column exists the result records whether
//! that order was actually chronological.

use super::interpretation;
use super::stats::{self, round_to};
use super::{AnalysisError, AnalysisKind, StatisticalFinding, StatisticalResult, TrendDirection, TrendResult};
use crate::execution::{ResultSet, Value};
use crate::localization::Language;

const MIN_VALUES: usize = 2;

pub fn analyze(results: &ResultSet, lang: Language) -> Result<StatisticalFinding, AnalysisError> {
    let metric_idx = *results
        .numeric_columns()
        .first()
        .ok_or(AnalysisError::NotEnoughNumericColumns { required: 1, found: 0 })?;

    let values = results.numeric_values(metric_idx);
    if values.len() < MIN_VALUES {
        return Err(AnalysisError::NotEnoughRows {
            required: MIN_VALUES,
            found: values.len(),
        });
    }

    let mid = values.len() / 2;
    let first = stats::mean(&values[..mid])?.ok_or_else(|| AnalysisError::NonFinite("first_half_avg".into()))?;
    let second = stats::mean(&values[mid..])?.ok_or_else(|| AnalysisError::NonFinite("second_half_avg".into()))?;

    let direction = if second > first {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };
    let strength = if first == 0.0 {
        0.0
    } else {
        (second - first).abs() / first.abs()
    };

    let time_idx = results.temporal_columns().first().copied();
    let result = TrendResult {
        direction,
        strength: round_to(strength, 3),
        metric: results.columns()[metric_idx].clone(),
        first_half_avg: round_to(first, 2),
        second_half_avg: round_to(second, 2),
        sample_size: values.len(),
        time_column: time_idx.map(|idx| results.columns()[idx].clone()),
        time_ordered: time_idx.map(|idx| is_chronological(results, idx)),
    };
    let text = interpretation::trend(&result, lang);

    Ok(StatisticalFinding::completed(
        AnalysisKind::Trend,
        StatisticalResult::Trend(result),
        text,
    ))
}

/// Non-null timestamps appear in non-decreasing order.
fn is_chronological(results: &ResultSet, idx: usize) -> bool {
    let stamps: Vec<_> = results
        .column(idx)
        .filter_map(|v| match v {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        })
        .collect();
    stamps.windows(2).all(|w| w[0] <= w[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result_set;
    use chrono::NaiveDate;

    fn series(values: &[i64]) -> ResultSet {
        let rows = values.iter().map(|v| vec![Value::Int(*v)]).collect();
        ResultSet::new(vec!["amount".into()], rows).unwrap()
    }

    fn trend_of(rs: &ResultSet) -> TrendResult {
        match analyze(rs, Language::English).unwrap().statistical_result {
            StatisticalResult::Trend(t) => t,
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_direction() {
        assert_eq!(trend_of(&series(&[1, 2, 3, 4, 5, 6])).direction, TrendDirection::Increasing);
        assert_eq!(trend_of(&series(&[6, 5, 4, 3, 2, 1])).direction, TrendDirection::Decreasing);
    }

    #[test]
    fn test_strength_is_relative_change() {
        let t = trend_of(&series(&[1, 2, 3, 4, 5, 6]));
        // halves average 2 and 5
        assert_eq!(t.first_half_avg, 2.0);
        assert_eq!(t.second_half_avg, 5.0);
        assert_eq!(t.strength, 1.5);
    }

    #[test]
    fn test_zero_first_half_has_zero_strength() {
        let t = trend_of(&series(&[0, 0, 4, 4]));
        assert_eq!(t.strength, 0.0);
        assert_eq!(t.direction, TrendDirection::Increasing);
    }

    #[test]
    fn test_equal_halves_are_decreasing() {
        assert_eq!(trend_of(&series(&[3, 3])).direction, TrendDirection::Decreasing);
    }

    #[test]
    fn test_needs_two_values() {
        let err = analyze(&series(&[1]), Language::English).unwrap_err();
        assert_eq!(err, AnalysisError::NotEnoughRows { required: 2, found: 1 });
    }

    #[test]
    fn test_reports_time_ordering() {
        let day = |d| NaiveDate::from_ymd_opt(2007, 2, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let rs = result_set!(["day", "total"], [day(15), 10], [day(14), 20], [day(16), 30]).unwrap();
        let t = trend_of(&rs);
        assert_eq!(t.time_column.as_deref(), Some("day"));
        assert_eq!(t.time_ordered, Some(false));

        assert_eq!(trend_of(&series(&[1, 2])).time_ordered, None);
    }
}
