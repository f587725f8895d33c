//! PostgreSQL executor
//!
//! Runs validated SQL inside a read-only transaction bounded by a statement
//! timeout. Queries go through the simple query protocol, so every cell comes
//! back as text and is typed here by its Postgres type name.

use crate::execution::{ExecutionError, QueryExecutor, ResultSet, Value};
use crate::observability::prefix;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Column, Executor, Row, TypeInfo};
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Postgres error code for a statement cancelled by `statement_timeout`.
const QUERY_CANCELED: &str = "57014";

/// Extra time the client-side timer allows beyond the server-side timeout.
const CLIENT_GRACE: Duration = Duration::from_secs(2);

pub struct PgExecutor {
    pool: PgPool,
    statement_timeout: Duration,
}

impl PgExecutor {
    pub fn new(pool: PgPool, statement_timeout: Duration) -> Self {
        Self { pool, statement_timeout }
    }

    async fn run(&self, sql: &str) -> Result<ResultSet, ExecutionError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ExecutionError::Connection(e.to_string()))?;

        (&mut *tx)
            .execute("SET TRANSACTION READ ONLY")
            .await
            .map_err(|e| self.classify(e))?;
        let timeout_stmt = format!("SET LOCAL statement_timeout = {}", self.statement_timeout.as_millis());
        (&mut *tx)
            .execute(timeout_stmt.as_str())
            .await
            .map_err(|e| self.classify(e))?;

        let rows = (&mut *tx).fetch_all(sql).await.map_err(|e| self.classify(e))?;

        // Read-only work; nothing to commit.
        if let Err(e) = tx.rollback().await {
            tracing::debug!(error = %e, "Rollback after read-only query failed");
        }

        decode_rows(&rows)
    }

    fn classify(&self, err: sqlx::Error) -> ExecutionError {
        match err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(QUERY_CANCELED) => {
                ExecutionError::Timeout(self.statement_timeout)
            }
            sqlx::Error::Database(db_err) => ExecutionError::Database(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                ExecutionError::Connection(err.to_string())
            }
            other => ExecutionError::Database(other.to_string()),
        }
    }
}

#[async_trait]
impl QueryExecutor for PgExecutor {
    async fn execute(&self, sql: &str) -> Result<ResultSet, ExecutionError> {
        let started = Instant::now();
        let outcome = match tokio::time::timeout(self.statement_timeout + CLIENT_GRACE, self.run(sql)).await {
            Ok(result) => result,
            Err(_) => Err(ExecutionError::Timeout(self.statement_timeout)),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &outcome {
            Ok(rs) => info!(
                sql = prefix(sql, 200),
                rows_returned = rs.row_count(),
                execution_time_ms = elapsed_ms,
                "SQL executed successfully"
            ),
            Err(e) => error!(
                sql = prefix(sql, 200),
                execution_time_ms = elapsed_ms,
                error = %e,
                "SQL execution failed"
            ),
        }
        outcome
    }
}

fn decode_rows(rows: &[PgRow]) -> Result<ResultSet, ExecutionError> {
    let raw_names: Vec<String> = rows
        .first()
        .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();

    // Joins can return the same name twice (`a.id`, `b.id`); suffix repeats.
    let mut columns: Vec<String> = Vec::with_capacity(raw_names.len());
    for name in raw_names {
        let mut candidate = name.clone();
        let mut n = 2;
        while columns.contains(&candidate) {
            candidate = format!("{}_{}", name, n);
            n += 1;
        }
        columns.push(candidate);
    }

    let mut decoded = Vec::with_capacity(rows.len());
    for row in rows {
        let mut cells = Vec::with_capacity(columns.len());
        for (idx, column) in row.columns().iter().enumerate() {
            let text: Option<String> = row
                .try_get_unchecked(idx)
                .map_err(|e| ExecutionError::Database(format!("Failed to read column {}: {}", column.name(), e)))?;
            let cell = match text {
                None => Value::Null,
                Some(text) => parse_cell(column.type_info().name(), &text),
            };
            cells.push(cell);
        }
        decoded.push(cells);
    }

    ResultSet::new(columns, decoded).map_err(|e| ExecutionError::Database(e.to_string()))
}

/// Type a text-format cell by its Postgres type name. Unknown types stay text.
fn parse_cell(type_name: &str, text: &str) -> Value {
    let parsed = match type_name {
        "INT2" | "INT4" | "INT8" | "OID" => text.parse::<i64>().ok().map(Value::Int),
        "FLOAT4" | "FLOAT8" | "NUMERIC" => text.parse::<f64>().ok().map(Value::Float),
        "BOOL" => match text {
            "t" | "true" => Some(Value::Bool(true)),
            "f" | "false" => Some(Value::Bool(false)),
            _ => None,
        },
        "TIMESTAMP" => NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
            .ok()
            .map(Value::Timestamp),
        "TIMESTAMPTZ" => DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%#z")
            .ok()
            .map(|dt| Value::Timestamp(dt.naive_utc())),
        "DATE" => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Value::Timestamp),
        _ => None,
    };
    parsed.unwrap_or_else(|| Value::Text(text.to_string()))
}
