//! Logger
//!
//! Installs the global `tracing` subscriber and provides helpers for keeping
//! logged questions and SQL short.

use crate::config::LoggingConfig;
use crate::error::{InsightError, Result};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| InsightError::Config(format!("Invalid log level '{}': {}", config.level, e)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = match config.format.to_lowercase().as_str() {
        "pretty" => builder.pretty().try_init(),
        "full" => builder.try_init(),
        _ => builder.compact().try_init(),
    };

    installed.map_err(|e| InsightError::Config(format!("Failed to install logger: {}", e)))
}

/// First `max_chars` characters of `text`, on a char boundary.
pub fn prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_respects_char_boundaries() {
        assert_eq!(prefix("hello world", 5), "hello");
        assert_eq!(prefix("short", 100), "short");
        assert_eq!(prefix("اعرض جميع الفئات", 4), "اعرض");
    }
}
