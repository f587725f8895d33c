//! Question-to-insight pipeline
//!
//! One request flows forward through the stages; each stage's result is
//! matched here so that best-effort stages fall back and mandatory ones end
//! the request with a professional message.

pub mod orchestrator;
pub mod outcome;

pub use orchestrator::{Pipeline, PipelineContext, PipelineOptions};
pub use outcome::{OutcomeMetadata, PipelineOutcome, PipelineStep};
