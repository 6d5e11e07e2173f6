//! Top-level error type for one user action (load or generate).

use crate::charts::{RenderError, ValidationError};
use crate::data::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisualizerError {
    #[error("Failed to read file: {0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("Failed to render chart: {0}")]
    Render(RenderError),
    #[error("Please upload a CSV file to begin.")]
    NoTable,
}

impl From<RenderError> for VisualizerError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Invalid(reason) => VisualizerError::Validation(reason),
            other => VisualizerError::Render(other),
        }
    }
}

impl VisualizerError {
    /// Validation problems are user warnings rather than failures.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            VisualizerError::Validation(_) | VisualizerError::NoTable
        )
    }
}
