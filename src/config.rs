//! Settings
//!
//! Environment-driven configuration. `.env` is loaded first, then each value is
//! read from the process environment with a typed default.

use crate::error::{InsightError, Result};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub pool_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl ModelConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().map_or(false, |k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct SqlSafetyConfig {
    pub max_rows: usize,
    pub statement_timeout: Duration,
    pub allowed_operations: Vec<String>,
}

impl Default for SqlSafetyConfig {
    fn default() -> Self {
        Self {
            max_rows: 1000,
            statement_timeout: Duration::from_secs(30),
            allowed_operations: vec!["SELECT".to_string()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database: DatabaseConfig,
    /// Model used for SQL generation.
    pub sql_model: ModelConfig,
    /// Model used for classification, refinement and response phrasing.
    pub assistant_model: ModelConfig,
    pub sql: SqlSafetyConfig,
    pub rag_top_k: usize,
    pub show_sql_to_user: bool,
    pub schema_cache_ttl: Duration,
    pub query_cache_ttl: Duration,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Load `.env` (if present) and read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Build settings from an explicit variable map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let env = EnvReader { vars };

        let database_url = match env.string("DATABASE_URL") {
            Some(url) => url,
            None => {
                let host = env.string("DB_HOST").unwrap_or_else(|| "localhost".to_string());
                let port: u16 = env.parse_or("DB_PORT", 5432)?;
                let name = env.string("DB_NAME").unwrap_or_else(|| "postgres".to_string());
                let user = env.string("DB_USER").unwrap_or_else(|| "postgres".to_string());
                let password = env.string("DB_PASSWORD").unwrap_or_default();
                format!("postgres://{}:{}@{}:{}/{}", user, password, host, port, name)
            }
        };

        let sql_model = ModelConfig {
            api_key: env.string("OPENAI_API_KEY"),
            base_url: env
                .string("LLM_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            model: env.string("LLM_MODEL").unwrap_or_else(|| "gpt-4".to_string()),
            temperature: env.parse_or("LLM_TEMPERATURE", 0.0)?,
            max_tokens: env.parse_or("LLM_MAX_TOKENS", 1000)?,
            timeout: Duration::from_secs(env.parse_or("LLM_TIMEOUT_SECONDS", 60)?),
        };

        // The assistant model falls back to the SQL model's endpoint and key.
        let assistant_model = ModelConfig {
            api_key: env.string("ASSISTANT_API_KEY").or_else(|| sql_model.api_key.clone()),
            base_url: env
                .string("ASSISTANT_BASE_URL")
                .unwrap_or_else(|| sql_model.base_url.clone()),
            model: env
                .string("ASSISTANT_MODEL")
                .unwrap_or_else(|| sql_model.model.clone()),
            temperature: env.parse_or("ASSISTANT_TEMPERATURE", 0.3)?,
            max_tokens: env.parse_or("ASSISTANT_MAX_TOKENS", 500)?,
            timeout: sql_model.timeout,
        };

        let allowed_operations = env
            .string("SQL_ALLOWED_OPERATIONS")
            .map(|raw| {
                raw.split(',')
                    .map(|op| op.trim().to_uppercase())
                    .filter(|op| !op.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|ops| !ops.is_empty())
            .unwrap_or_else(|| vec!["SELECT".to_string()]);

        Ok(Self {
            database: DatabaseConfig {
                url: database_url,
                pool_size: env.parse_or("DB_POOL_SIZE", 10)?,
                pool_timeout: Duration::from_secs(env.parse_or("DB_POOL_TIMEOUT", 30)?),
            },
            sql_model,
            assistant_model,
            sql: SqlSafetyConfig {
                max_rows: env.parse_or("SQL_MAX_ROWS", 1000)?,
                statement_timeout: Duration::from_secs(env.parse_or("SQL_TIMEOUT_SECONDS", 30)?),
                allowed_operations,
            },
            rag_top_k: env.parse_or("RAG_TOP_K", 5)?,
            show_sql_to_user: env.bool_or("SHOW_SQL_TO_USER", true)?,
            schema_cache_ttl: Duration::from_secs(env.parse_or("SCHEMA_CACHE_TTL_SECONDS", 300)?),
            query_cache_ttl: Duration::from_secs(env.parse_or("QUERY_CACHE_TTL_SECONDS", 3600)?),
            logging: LoggingConfig {
                level: env.string("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
                format: env.string("LOG_FORMAT").unwrap_or_else(|| "compact".to_string()),
            },
        })
    }
}

struct EnvReader<'a> {
    vars: &'a HashMap<String, String>,
}

impl<'a> EnvReader<'a> {
    /// Non-empty value for `key`, trimmed.
    fn string(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_or<T: FromStr>(&self, key: &str, default: T) -> Result<T> {
        match self.string(key) {
            None => Ok(default),
            Some(raw) => raw.parse::<T>().map_err(|_| {
                InsightError::Config(format!("Invalid value for {}: '{}'", key, raw))
            }),
        }
    }

    fn bool_or(&self, key: &str, default: bool) -> Result<bool> {
        match self.string(key).map(|v| v.to_lowercase()) {
            None => Ok(default),
            Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
            Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
            Some(v) => Err(InsightError::Config(format!("Invalid value for {}: '{}'", key, v))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_vars(&HashMap::new()).unwrap();
        assert_eq!(settings.sql.max_rows, 1000);
        assert_eq!(settings.sql.statement_timeout, Duration::from_secs(30));
        assert_eq!(settings.sql.allowed_operations, vec!["SELECT".to_string()]);
        assert_eq!(settings.rag_top_k, 5);
        assert!(settings.show_sql_to_user);
        assert_eq!(settings.database.url, "postgres://postgres:@localhost:5432/postgres");
        assert!(!settings.sql_model.is_configured());
    }

    #[test]
    fn test_overrides_and_assistant_fallback() {
        let settings = Settings::from_vars(&vars(&[
            ("DATABASE_URL", "postgres://u:p@db/dvdrental"),
            ("OPENAI_API_KEY", "sk-test"),
            ("SQL_MAX_ROWS", "250"),
            ("SQL_ALLOWED_OPERATIONS", "select, explain"),
            ("SHOW_SQL_TO_USER", "false"),
        ]))
        .unwrap();

        assert_eq!(settings.database.url, "postgres://u:p@db/dvdrental");
        assert_eq!(settings.sql.max_rows, 250);
        assert_eq!(settings.sql.allowed_operations, vec!["SELECT", "EXPLAIN"]);
        assert!(!settings.show_sql_to_user);
        assert_eq!(settings.assistant_model.api_key.as_deref(), Some("sk-test"));
        assert!((settings.assistant_model.temperature - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let err = Settings::from_vars(&vars(&[("SQL_MAX_ROWS", "lots")])).unwrap_err();
        assert!(matches!(err, InsightError::Config(msg) if msg.contains("SQL_MAX_ROWS")));
    }
}
