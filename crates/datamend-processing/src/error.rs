//! Error types for the remediation pipeline.
//!
//! Every failure surfaced to callers carries a stable error code so tooling
//! built on top of the crate can branch on failure class without parsing
//! messages.

use serde::Serialize;
use serde::ser::SerializeStruct;

/// Errors that can occur during data remediation.
#[derive(Debug, thiserror::Error)]
pub enum CleaningError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] crate::config::ConfigValidationError),

    #[error("Dataset has {rows} rows, exceeding the configured limit of {max_rows}")]
    CapacityExceeded { rows: usize, max_rows: usize },

    #[error("Schema profiling failed: {0}")]
    ProfilingFailed(String),

    #[error("Quality assessment failed: {0}")]
    AssessmentFailed(String),

    #[error("Stage '{stage}' failed: {message}")]
    StageFailed { stage: String, message: String },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DataFrame operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl CleaningError {
    /// Stable machine-readable code for this error class.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            Self::ProfilingFailed(_) => "PROFILING_FAILED",
            Self::AssessmentFailed(_) => "ASSESSMENT_FAILED",
            Self::StageFailed { .. } => "STAGE_FAILED",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "DATAFRAME_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }

    /// Convenience constructor for stage failures.
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StageFailed {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

// Serialized as {code, message} so frontends get a stable shape regardless of
// the underlying variant.
impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CleaningError>;
