//! Pearson correlation between two numeric columns.

use super::interpretation;
use super::stats::{pearson, round_to};
use super::{
    AnalysisError, AnalysisKind, CorrelationDirection, CorrelationResult, CorrelationStrength, StatisticalFinding,
    StatisticalResult,
};
use crate::execution::ResultSet;
use crate::localization::Language;
use std::collections::BTreeSet;

const MIN_ROWS: usize = 3;

pub fn analyze(
    results: &ResultSet,
    metrics: &BTreeSet<String>,
    lang: Language,
) -> Result<StatisticalFinding, AnalysisError> {
    let numeric = results.numeric_columns();
    if numeric.len() < 2 {
        return Err(AnalysisError::NotEnoughNumericColumns {
            required: 2,
            found: numeric.len(),
        });
    }

    let (x, y) = pick_columns(results, &numeric, metrics);

    // Rows with a null (or non-finite) value in either column are dropped.
    let (xs, ys): (Vec<f64>, Vec<f64>) = results
        .rows()
        .iter()
        .filter_map(|row| Some((row.get(x)?.as_f64()?, row.get(y)?.as_f64()?)))
        .unzip();
    if xs.len() < MIN_ROWS {
        return Err(AnalysisError::NotEnoughRows {
            required: MIN_ROWS,
            found: xs.len(),
        });
    }

    let r = pearson(&xs, &ys)?;
    let result = CorrelationResult {
        correlation_coefficient: round_to(r, 3),
        strength: CorrelationStrength::from_coefficient(r),
        direction: CorrelationDirection::from_coefficient(r),
        x_variable: results.columns()[x].clone(),
        y_variable: results.columns()[y].clone(),
        sample_size: xs.len(),
    };
    let text = interpretation::correlation(&result, lang);

    Ok(StatisticalFinding::completed(
        AnalysisKind::Correlation,
        StatisticalResult::Correlation(result),
        text,
    ))
}

/// Columns whose names relate to the requested metrics, else the first two
/// numeric columns. `numeric` must hold at least two indices.
pub fn pick_columns(results: &ResultSet, numeric: &[usize], metrics: &BTreeSet<String>) -> (usize, usize) {
    let mut picked: Vec<usize> = Vec::with_capacity(2);
    'metrics: for metric in metrics {
        let metric = metric.to_lowercase();
        for &idx in numeric {
            let column = results.columns()[idx].to_lowercase();
            let related = column.contains(&metric) || metric.contains(&column);
            if related && !picked.contains(&idx) {
                picked.push(idx);
                if picked.len() == 2 {
                    break 'metrics;
                }
                continue 'metrics;
            }
        }
    }

    match picked.as_slice() {
        [x, y] => (*x, *y),
        _ => (numeric[0], numeric[1]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::Value;
    use crate::result_set;

    fn no_metrics() -> BTreeSet<String> {
        BTreeSet::new()
    }

    #[test]
    fn test_perfect_positive_correlation() {
        let rows: Vec<Vec<Value>> = (1..=10)
            .map(|x| vec![Value::Int(x), Value::Int(2 * x)])
            .collect();
        let rs = ResultSet::new(vec!["x".into(), "y".into()], rows).unwrap();

        let finding = analyze(&rs, &no_metrics(), Language::English).unwrap();
        match finding.statistical_result {
            StatisticalResult::Correlation(c) => {
                assert!((c.correlation_coefficient - 1.0).abs() < 1e-9);
                assert_eq!(c.strength, CorrelationStrength::VeryStrong);
                assert_eq!(c.direction, CorrelationDirection::Positive);
                assert_eq!(c.sample_size, 10);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_nulls_dropped_before_row_check() {
        let rs = result_set!(
            ["a", "b"],
            [1, 2],
            [2, Value::Null],
            [3, 6],
            [Value::Null, 8],
        )
        .unwrap();
        let err = analyze(&rs, &no_metrics(), Language::English).unwrap_err();
        assert_eq!(err, AnalysisError::NotEnoughRows { required: 3, found: 2 });
    }

    #[test]
    fn test_needs_two_numeric_columns() {
        let rs = result_set!(["name", "n"], ["a", 1], ["b", 2], ["c", 3]).unwrap();
        let err = analyze(&rs, &no_metrics(), Language::English).unwrap_err();
        assert_eq!(err, AnalysisError::NotEnoughNumericColumns { required: 2, found: 1 });
    }

    #[test]
    fn test_metric_columns_preferred() {
        let rs = result_set!(
            ["film_id", "length", "rental_rate", "revenue"],
            [1, 90, 0.99, 10.0],
            [2, 100, 2.99, 20.0],
            [3, 120, 4.99, 35.0],
        )
        .unwrap();
        let metrics: BTreeSet<String> = ["rate".to_string(), "revenue".to_string()].into_iter().collect();
        assert_eq!(pick_columns(&rs, &rs.numeric_columns(), &metrics), (2, 3));
        assert_eq!(pick_columns(&rs, &rs.numeric_columns(), &no_metrics()), (0, 1));
    }

    #[test]
    fn test_constant_column_is_zero() {
        let rs = result_set!(["a", "b"], [1, 5], [2, 5], [3, 5]).unwrap();
        let finding = analyze(&rs, &no_metrics(), Language::English).unwrap();
        match finding.statistical_result {
            StatisticalResult::Correlation(c) => {
                assert_eq!(c.correlation_coefficient, 0.0);
                assert_eq!(c.strength, CorrelationStrength::VeryWeak);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
}
