//! Descriptive statistics over numeric columns, computed with polars.
//!
//! Inputs are finite `f64` values (nulls already dropped). Polars returns null
//! or NaN for undefined statistics; both come back as `None`.

use super::{AnalysisError, GroupStats};
use polars::prelude::*;

const VALUE: &str = "value";
const GROUP: &str = "group";

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// `Some(value)` when finite.
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Summary of one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// Sample standard deviation (n - 1 denominator).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub sum: f64,
}

/// Read row `idx` of a numeric result column, NaN and null as `None`.
fn scalar(df: &DataFrame, name: &str, idx: usize) -> Result<Option<f64>, AnalysisError> {
    Ok(df.column(name)?.get(idx)?.extract::<f64>().and_then(finite))
}

fn count_at(df: &DataFrame, name: &str, idx: usize) -> Result<usize, AnalysisError> {
    Ok(df.column(name)?.get(idx)?.extract::<usize>().unwrap_or(0))
}

pub fn describe(values: &[f64]) -> Result<Summary, AnalysisError> {
    let df = DataFrame::new(vec![Series::new(VALUE, values)])?;
    let stats = df
        .lazy()
        .select([
            col(VALUE).count().alias("count"),
            col(VALUE).mean().alias("mean"),
            col(VALUE).median().alias("median"),
            col(VALUE).std(1).alias("std"),
            col(VALUE).min().alias("min"),
            col(VALUE).max().alias("max"),
            col(VALUE).sum().alias("sum"),
        ])
        .collect()?;

    let std = if values.len() < 2 { None } else { scalar(&stats, "std", 0)? };
    Ok(Summary {
        count: count_at(&stats, "count", 0)?,
        mean: scalar(&stats, "mean", 0)?,
        median: scalar(&stats, "median", 0)?,
        std,
        min: scalar(&stats, "min", 0)?,
        max: scalar(&stats, "max", 0)?,
        sum: scalar(&stats, "sum", 0)?.unwrap_or(0.0),
    })
}

/// Mean of the values; `None` when empty or non-finite.
pub fn mean(values: &[f64]) -> Result<Option<f64>, AnalysisError> {
    Ok(describe(values)?.mean)
}

/// Group `values` by `labels` (null labels dropped, null values not counted).
/// Groups come back sorted by label.
pub fn group_summaries(
    labels: Vec<Option<String>>,
    values: Vec<Option<f64>>,
) -> Result<Vec<GroupStats>, AnalysisError> {
    let df = DataFrame::new(vec![Series::new(GROUP, labels), Series::new(VALUE, values)])?;
    let grouped = df
        .lazy()
        .filter(col(GROUP).is_not_null())
        .group_by([col(GROUP)])
        .agg([
            col(VALUE).mean().alias("mean"),
            col(VALUE).sum().alias("sum"),
            col(VALUE).count().alias("count"),
        ])
        .collect()?;

    let names = grouped.column(GROUP)?.str()?;
    let mut out = Vec::with_capacity(grouped.height());
    for (idx, name) in names.into_iter().enumerate() {
        let Some(name) = name else { continue };
        out.push(GroupStats {
            group: name.to_string(),
            mean: scalar(&grouped, "mean", idx)?,
            sum: scalar(&grouped, "sum", idx)?.unwrap_or(0.0),
            count: count_at(&grouped, "count", idx)?,
        });
    }
    out.sort_by(|a, b| a.group.cmp(&b.group));
    Ok(out)
}

/// Pearson correlation of paired samples. Zero variance (undefined r) and
/// non-finite results come back as 0.0.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Result<f64, AnalysisError> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return Ok(0.0);
    }
    let df = DataFrame::new(vec![Series::new("x", &xs[..n]), Series::new("y", &ys[..n])])?;
    let corr = df
        .lazy()
        .select([pearson_corr(col("x"), col("y"), 1).alias("r")])
        .collect()?;
    Ok(scalar(&corr, "r", 0)?.map_or(0.0, |r| r.clamp(-1.0, 1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let s = describe(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(s.count, 5);
        assert_eq!(s.mean, Some(3.0));
        assert_eq!(s.median, Some(3.0));
        assert_eq!(s.min, Some(1.0));
        assert_eq!(s.max, Some(5.0));
        assert_eq!(s.sum, 15.0);
        assert!((s.std.unwrap() - 1.5811).abs() < 1e-4);
        assert_eq!(describe(&[4.0, 1.0, 3.0, 2.0]).unwrap().median, Some(2.5));
    }

    #[test]
    fn test_empty_and_single() {
        let empty = describe(&[]).unwrap();
        assert_eq!(empty.count, 0);
        assert_eq!(empty.mean, None);
        assert_eq!(empty.median, None);
        assert_eq!(empty.min, None);
        assert_eq!(describe(&[7.0]).unwrap().std, None);
        assert_eq!(mean(&[]).unwrap(), None);
    }

    #[test]
    fn test_group_summaries() {
        let labels: Vec<Option<String>> = ["B", "A", "", "A", "C"]
            .iter()
            .map(|l| (!l.is_empty()).then(|| l.to_string()))
            .collect();
        let values = vec![Some(50.0), Some(10.0), Some(100.0), Some(20.0), None];
        let groups = group_summaries(labels, values).unwrap();

        let names: Vec<&str> = groups.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(groups[0].mean, Some(15.0));
        assert_eq!(groups[0].sum, 30.0);
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[2].mean, None);
        assert_eq!(groups[2].count, 0);
    }

    #[test]
    fn test_pearson() {
        let x: Vec<f64> = (1..=10).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v).collect();
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);

        let neg: Vec<f64> = x.iter().map(|v| -v).collect();
        assert!((pearson(&x, &neg).unwrap() + 1.0).abs() < 1e-12);

        // Zero variance is undefined; reported as no correlation.
        assert_eq!(pearson(&x, &[3.0; 10]).unwrap(), 0.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.12345, 3), 0.123);
        assert_eq!(round_to(2.675, 1), 2.7);
        assert_eq!(round_to(-1.005, 0), -1.0);
    }
}
