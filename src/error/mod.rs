//! Error handling module for ClipStudio

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for ClipStudio operations
#[derive(Error, Debug)]
pub enum ClipStudioError {
    /// Source could not be opened or its probe output could not be parsed
    #[error("Failed to probe media file {path}: {message}")]
    Probe { path: PathBuf, message: String },

    /// Request rejected before any subprocess ran
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// External encoder exited with a non-zero status
    #[error("Transcode stage '{stage}' failed (exit code {exit_code:?}): {diagnostic}")]
    TranscodeFailure {
        stage: String,
        exit_code: Option<i32>,
        diagnostic: String,
    },

    /// Encoder reported success but the declared output is absent or empty
    #[error("Transcode stage '{stage}' reported success but output is missing: {}", path.display())]
    OutputMissing { stage: String, path: PathBuf },

    /// Plan could not be turned into encoder invocations
    #[error("Filter graph compilation failed: {0}")]
    Compile(String),

    /// External binary not found on PATH
    #[error("Required tool not found: {0}")]
    ToolNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ClipStudioError {
    /// Create an invalid parameters error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameters(message.into())
    }

    /// Create a probe error for a path
    pub fn probe(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Probe {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True for failures raised by an external transcode stage
    pub fn is_transcode_failure(&self) -> bool {
        matches!(
            self,
            Self::TranscodeFailure { .. } | Self::OutputMissing { .. }
        )
    }

    /// True when the request was rejected before committing resources
    pub fn is_invalid_parameters(&self) -> bool {
        matches!(self, Self::InvalidParameters(_))
    }
}

/// Result type alias for ClipStudio operations
pub type ClipStudioResult<T> = std::result::Result<T, ClipStudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_missing_counts_as_transcode_failure() {
        let err = ClipStudioError::OutputMissing {
            stage: "concat".to_string(),
            path: PathBuf::from("/tmp/out.mp4"),
        };
        assert!(err.is_transcode_failure());
        assert!(!err.is_invalid_parameters());
    }

    #[test]
    fn test_transcode_failure_message_carries_diagnostic() {
        let err = ClipStudioError::TranscodeFailure {
            stage: "segment-0".to_string(),
            exit_code: Some(1),
            diagnostic: "Invalid data found when processing input".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("segment-0"));
        assert!(message.contains("Invalid data found"));
    }
}
