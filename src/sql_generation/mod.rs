//! SQL generation
//!
//! The language model's reply is untrusted text: the statement is cut out of
//! it and structurally checked before it is handed to the security validator.

pub mod extract;
pub mod generator;

pub use extract::{check_completeness, extract_sql};
pub use generator::SqlGenerator;

use crate::llm::CallError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerationError {
    #[error("could not extract SQL")]
    Extraction,

    #[error("incomplete SQL: {0}")]
    Incomplete(String),

    #[error("model call failed: {0}")]
    Model(#[from] CallError),
}
