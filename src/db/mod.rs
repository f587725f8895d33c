//! Database module for PostgreSQL connection and query execution
//!
//! Provides the pooled connection and the read-only executor used by the pipeline.

pub mod connection;
pub mod executor;

pub use connection::{init_pool, DbPool};
pub use executor::PgExecutor;
