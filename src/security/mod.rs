//! Security
//!
//! Gatekeeping for generated SQL and for the questions themselves.

pub mod sensitivity;
pub mod sql_validator;

pub use sensitivity::{KeywordSensitivityGuard, SensitivityGuard, SensitivityVerdict};
pub use sql_validator::{SqlSecurityValidator, ValidationError, BLOCKED_KEYWORDS};
