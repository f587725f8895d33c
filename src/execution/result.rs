//! Result Set - typed tabular result returned by the execution collaborator
//!
//! Rows are positional against `columns`, so column order from the database is
//! preserved all the way to the response and the chart renderer.

use crate::error::{InsightError, Result};
use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Numeric view of the cell. Non-finite floats count as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) if f.is_finite() => Some(*f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Timestamp(ts) => serde_json::Value::String(ts.format("%Y-%m-%dT%H:%M:%S").to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
            Value::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Value::Float(_) => serializer.serialize_none(),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Timestamp(ts) => serializer.collect_str(&ts.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Shape of a column, judged over its non-null cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Text,
    Boolean,
    Temporal,
    Mixed,
    /// Every cell is null (or there are no rows).
    Empty,
}

/// Ordered column names plus positional rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ResultSet {
    /// Build a result set; every row must have one cell per column and column
    /// names must be unique.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        for (idx, name) in columns.iter().enumerate() {
            if columns[..idx].contains(name) {
                return Err(InsightError::Execution(format!("Duplicate column name: {}", name)));
            }
        }
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(InsightError::Execution(format!(
                "Row {} has {} cells, expected {}",
                idx,
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().filter_map(move |row| row.get(idx))
    }

    pub fn column_kind(&self, idx: usize) -> ColumnKind {
        let mut kind: Option<ColumnKind> = None;
        for value in self.column(idx) {
            let cell = match value {
                Value::Null => continue,
                Value::Int(_) | Value::Float(_) => ColumnKind::Numeric,
                Value::Text(_) => ColumnKind::Text,
                Value::Bool(_) => ColumnKind::Boolean,
                Value::Timestamp(_) => ColumnKind::Temporal,
            };
            match kind {
                None => kind = Some(cell),
                Some(k) if k == cell => {}
                Some(_) => return ColumnKind::Mixed,
            }
        }
        kind.unwrap_or(ColumnKind::Empty)
    }

    fn columns_of_kind(&self, wanted: ColumnKind) -> Vec<usize> {
        (0..self.columns.len())
            .filter(|&idx| self.column_kind(idx) == wanted)
            .collect()
    }

    /// Indices of numeric columns, in column order.
    pub fn numeric_columns(&self) -> Vec<usize> {
        self.columns_of_kind(ColumnKind::Numeric)
    }

    /// Indices of text (categorical) columns, in column order.
    pub fn text_columns(&self) -> Vec<usize> {
        self.columns_of_kind(ColumnKind::Text)
    }

    pub fn temporal_columns(&self) -> Vec<usize> {
        self.columns_of_kind(ColumnKind::Temporal)
    }

    /// Finite numeric values of a column, nulls dropped, row order kept.
    pub fn numeric_values(&self, idx: usize) -> Vec<f64> {
        self.column(idx).filter_map(Value::as_f64).collect()
    }

    /// Row objects for JSON responses.
    pub fn to_records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row.iter())
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect()
            })
            .collect()
    }

    /// Convert to a polars DataFrame for chart renderers.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut series = Vec::with_capacity(self.columns.len());
        for (idx, name) in self.columns.iter().enumerate() {
            let s = match self.column_kind(idx) {
                ColumnKind::Numeric if self.column(idx).all(|v| matches!(v, Value::Int(_) | Value::Null)) => {
                    let values: Vec<Option<i64>> = self
                        .column(idx)
                        .map(|v| match v {
                            Value::Int(i) => Some(*i),
                            _ => None,
                        })
                        .collect();
                    Series::new(name, values)
                }
                ColumnKind::Numeric => {
                    let values: Vec<Option<f64>> = self.column(idx).map(Value::as_f64).collect();
                    Series::new(name, values)
                }
                ColumnKind::Boolean => {
                    let values: Vec<Option<bool>> = self
                        .column(idx)
                        .map(|v| match v {
                            Value::Bool(b) => Some(*b),
                            _ => None,
                        })
                        .collect();
                    Series::new(name, values)
                }
                _ => {
                    let values: Vec<Option<String>> = self
                        .column(idx)
                        .map(|v| if v.is_null() { None } else { Some(v.to_string()) })
                        .collect();
                    Series::new(name, values)
                }
            };
            series.push(s);
        }
        Ok(DataFrame::new(series)?)
    }
}

/// Build a result set from column names and rows of `Into<Value>` cells.
#[macro_export]
macro_rules! result_set {
    ([$($col:expr),* $(,)?] $(, [$($cell:expr),* $(,)?])* $(,)?) => {
        $crate::execution::ResultSet::new(
            vec![$($col.to_string()),*],
            vec![$(vec![$($crate::execution::Value::from($cell)),*]),*],
        )
    };
}
