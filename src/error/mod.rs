//! Error handling for the health and water-quality pipeline.

use std::io;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Specialized error type for pipeline operations
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Malformed or inconsistent input data, e.g. duplicate join keys
    #[error("Schema error: {0}")]
    Schema(String),

    /// An export format outside csv, png and html, or a format the artifact cannot take
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// A filter request that cannot be satisfied as stated
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Error while rasterising or encoding a chart
    #[error("Render error: {0}")]
    Render(String),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error opening or reading a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error (de)serializing JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Create a schema error from any message
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Create an invalid request error from any message
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Whether the error aborts only the current request rather than indicating bad data
    #[must_use]
    pub const fn is_request_scoped(&self) -> bool {
        matches!(self, Self::UnsupportedFormat(_) | Self::InvalidRequest(_))
    }
}

impl From<png::EncodingError> for PipelineError {
    fn from(error: png::EncodingError) -> Self {
        Self::Render(error.to_string())
    }
}

impl From<askama::Error> for PipelineError {
    fn from(error: askama::Error) -> Self {
        Self::Render(error.to_string())
    }
}

impl From<serde_arrow::Error> for PipelineError {
    fn from(error: serde_arrow::Error) -> Self {
        Self::Schema(format!("Arrow conversion failed: {error}"))
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_scoped_errors() {
        assert!(PipelineError::UnsupportedFormat("xlsx".into()).is_request_scoped());
        assert!(PipelineError::invalid_request("start after end").is_request_scoped());
        assert!(!PipelineError::schema("duplicate location").is_request_scoped());
    }

    #[test]
    fn test_display_messages() {
        let err = PipelineError::schema("duplicate water sample location 'Assam'");
        assert_eq!(
            err.to_string(),
            "Schema error: duplicate water sample location 'Assam'"
        );

        let err = PipelineError::UnsupportedFormat("xlsx".into());
        assert_eq!(err.to_string(), "Unsupported export format: xlsx");
    }
}
