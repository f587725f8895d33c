//! Execution
//!
//! Typed result sets and the database execution contract.

pub mod executor;
pub mod result;

pub use executor::{ExecutionError, QueryExecutor};
pub use result::{ColumnKind, ResultSet, Value};
