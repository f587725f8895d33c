//! Chart renderer boundary.
//!
//! Rendering is done elsewhere; this crate hands over a DataFrame plus the
//! chosen chart type and gets back an opaque locator.

use super::VisualizationType;
use crate::intent::Intent;
use async_trait::async_trait;
use polars::prelude::DataFrame;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Chart renderer is not available")]
    Unavailable,

    #[error("No data to visualize")]
    NoData,

    #[error("Chart rendering failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub data: DataFrame,
    pub visualization_type: VisualizationType,
    pub intent: Intent,
    pub statistical_result: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartArtifact {
    #[serde(rename = "type")]
    pub chart_type: VisualizationType,
    /// Where the rendered chart can be fetched (URL or path).
    pub locator: String,
}

#[async_trait]
pub trait ChartRenderer: Send + Sync {
    async fn render(&self, request: ChartRequest) -> Result<ChartArtifact, RenderError>;
}
