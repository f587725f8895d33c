//! SQL Security Validator
//!
//! Allow-list of top-level operations plus a block-list of destructive
//! keywords checked over every token of the statement. A block-list hit
//! rejects the statement even when the top-level operation is SELECT.

use crate::config::SqlSafetyConfig;
use crate::observability::prefix;
use lazy_static::lazy_static;
use regex::Regex;
use sqlparser::ast::{SetExpr, Statement};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, Tokenizer};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Keywords rejected anywhere in a statement.
pub const BLOCKED_KEYWORDS: [&str; 14] = [
    "DELETE", "DROP", "TRUNCATE", "ALTER", "CREATE", "INSERT", "UPDATE", "GRANT", "REVOKE", "EXEC",
    "EXECUTE", "CALL", "MERGE", "COPY",
];

lazy_static! {
    static ref LIMIT_CLAUSE: Regex = Regex::new(r"(?i)\bLIMIT\b").expect("valid limit pattern");
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Empty SQL query")]
    Empty,

    #[error("Invalid SQL syntax: {0}")]
    Unparsable(String),

    #[error("Only a single statement is allowed, found {0}")]
    MultipleStatements(usize),

    #[error("Operation '{0}' is not allowed. Only SELECT queries are permitted.")]
    OperationNotAllowed(String),

    #[error("Keyword '{0}' is not allowed for security reasons.")]
    BlockedKeyword(String),

    #[error("Only SELECT statements are allowed, found '{0}'")]
    NotSelect(String),
}

/// Validates and sanitizes SQL before it reaches the database.
#[derive(Debug, Clone)]
pub struct SqlSecurityValidator {
    allowed_operations: HashSet<String>,
    blocked_keywords: HashSet<&'static str>,
    max_rows: usize,
}

impl Default for SqlSecurityValidator {
    fn default() -> Self {
        Self::new(&SqlSafetyConfig::default())
    }
}

impl SqlSecurityValidator {
    pub fn new(config: &SqlSafetyConfig) -> Self {
        Self {
            allowed_operations: config.allowed_operations.iter().map(|op| op.to_uppercase()).collect(),
            blocked_keywords: BLOCKED_KEYWORDS.iter().copied().collect(),
            max_rows: config.max_rows,
        }
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// Validate a SQL string. A missing LIMIT is logged, not rejected.
    pub fn validate(&self, sql: &str) -> Result<(), ValidationError> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(ValidationError::Empty);
        }

        let dialect = PostgreSqlDialect {};

        let tokens = Tokenizer::new(&dialect, sql)
            .tokenize()
            .map_err(|e| ValidationError::Unparsable(e.to_string()))?;
        if let Some(keyword) = self.find_blocked_keyword(&tokens) {
            return Err(ValidationError::BlockedKeyword(keyword));
        }

        let statements =
            Parser::parse_sql(&dialect, sql).map_err(|e| ValidationError::Unparsable(e.to_string()))?;
        let statement = match statements.as_slice() {
            [] => return Err(ValidationError::Unparsable("no statement found".to_string())),
            [single] => single,
            many => return Err(ValidationError::MultipleStatements(many.len())),
        };

        let operation = operation_name(statement);
        if !self.allowed_operations.contains(&operation) {
            return Err(ValidationError::OperationNotAllowed(operation));
        }
        if operation != "SELECT" {
            return Err(ValidationError::NotSelect(operation));
        }

        if !has_limit_clause(sql) {
            warn!(sql = prefix(sql, 100), "Query missing LIMIT clause");
        }

        debug!(sql = prefix(sql, 200), "SQL passed security validation");
        Ok(())
    }

    /// Strip trailing semicolons and append `LIMIT <max_rows>` when no LIMIT is
    /// present. Performs no safety filtering; call only after `validate`.
    pub fn sanitize(&self, sql: &str) -> String {
        let sql = sql.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace());
        if has_limit_clause(sql) {
            sql.to_string()
        } else {
            format!("{} LIMIT {}", sql, self.max_rows)
        }
    }

    fn find_blocked_keyword(&self, tokens: &[Token]) -> Option<String> {
        tokens.iter().find_map(|token| match token {
            Token::Word(word) if word.quote_style.is_none() => {
                let upper = word.value.to_uppercase();
                if self.blocked_keywords.contains(upper.as_str()) {
                    Some(upper)
                } else {
                    None
                }
            }
            _ => None,
        })
    }
}

/// True when the SQL contains a standalone LIMIT keyword.
pub fn has_limit_clause(sql: &str) -> bool {
    LIMIT_CLAUSE.is_match(sql)
}

/// Top-level operation of a parsed statement, e.g. `SELECT` or `INSERT`.
fn operation_name(statement: &Statement) -> String {
    match statement {
        Statement::Query(query) => match query.body.as_ref() {
            SetExpr::Insert(inner) => operation_name(inner),
            _ => "SELECT".to_string(),
        },
        other => other
            .to_string()
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> SqlSecurityValidator {
        SqlSecurityValidator::default()
    }

    #[test]
    fn test_accepts_plain_select() {
        assert!(validator().validate("SELECT name FROM category LIMIT 10").is_ok());
        assert!(validator()
            .validate("WITH top AS (SELECT film_id FROM film) SELECT * FROM top")
            .is_ok());
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(validator().validate("   "), Err(ValidationError::Empty));
    }

    #[test]
    fn test_rejects_unparsable() {
        assert!(matches!(
            validator().validate("SELECT FROM WHERE ("),
            Err(ValidationError::Unparsable(_))
        ));
    }

    #[test]
    fn test_blocked_keyword_in_any_position() {
        let cases = [
            "DROP TABLE film",
            "SELECT * FROM film; DELETE FROM film",
            "WITH gone AS (DELETE FROM film RETURNING *) SELECT * FROM gone",
            "SELECT * FROM film WHERE film_id IN (SELECT 1) AND truncate = 1",
            "select * from film where exists (select 1) union select 1; grant all on film to bob",
        ];
        for sql in cases {
            assert!(
                matches!(validator().validate(sql), Err(ValidationError::BlockedKeyword(_))),
                "expected block-list rejection for {}",
                sql
            );
        }
    }

    #[test]
    fn test_keywords_inside_literals_and_quoted_identifiers_pass() {
        assert!(validator()
            .validate("SELECT title FROM film WHERE description = 'drop the act' LIMIT 5")
            .is_ok());
        assert!(validator().validate("SELECT \"update\" FROM audit_log LIMIT 5").is_ok());
    }

    #[test]
    fn test_operation_outside_allow_list() {
        let result = validator().validate("SHOW search_path");
        assert!(matches!(result, Err(ValidationError::OperationNotAllowed(op)) if op == "SHOW"));
    }

    #[test]
    fn test_allow_listed_non_select_is_still_rejected() {
        let config = SqlSafetyConfig {
            allowed_operations: vec!["SELECT".into(), "SHOW".into()],
            ..SqlSafetyConfig::default()
        };
        let result = SqlSecurityValidator::new(&config).validate("SHOW search_path");
        assert!(matches!(result, Err(ValidationError::NotSelect(op)) if op == "SHOW"));
    }

    #[test]
    fn test_multiple_selects_rejected() {
        assert_eq!(
            validator().validate("SELECT 1; SELECT 2"),
            Err(ValidationError::MultipleStatements(2))
        );
    }

    #[test]
    fn test_missing_limit_is_not_rejected() {
        assert!(validator().validate("SELECT * FROM film").is_ok());
    }

    #[test]
    fn test_sanitize_appends_configured_limit() {
        let config = SqlSafetyConfig {
            max_rows: 250,
            ..SqlSafetyConfig::default()
        };
        let v = SqlSecurityValidator::new(&config);
        assert_eq!(v.sanitize("SELECT * FROM film;"), "SELECT * FROM film LIMIT 250");
        assert_eq!(v.sanitize("  SELECT * FROM film LIMIT 5 ; "), "SELECT * FROM film LIMIT 5");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let v = validator();
        for sql in ["SELECT * FROM film LIMIT 10", "SELECT * FROM film", "SELECT 1;"] {
            let once = v.sanitize(sql);
            assert_eq!(v.sanitize(&once), once);
        }
    }
}
