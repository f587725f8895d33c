//! Observability
//!
//! Tracing subscriber setup and log-field helpers.

pub mod logger;

pub use logger::{init_logging, prefix};
