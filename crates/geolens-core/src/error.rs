//! Error types module
//!
//! All pipeline failures are unified under the `PipelineError` enum. None of them is
//! fatal: every variant leaves the orchestrator in a state from which a new run can
//! be started. Infrastructure crates keep their own error enums and are mapped into
//! `UploadFailed` / `AnalysisFailed` at the orchestration boundary.

use crate::models::RunId;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for caller misuse such as triggering a run twice
    Debug,
    /// Warning level - for user-correctable input problems
    Warn,
    /// Error level - for failures of an external collaborator
    Error,
}

/// Metadata for error presentation - defines how an error should be shown to an operator.
/// This trait allows errors to self-describe their user-facing characteristics.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "UPLOAD_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether a new run can reasonably succeed after this error
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the operator
    fn suggested_action(&self) -> Option<&'static str>;

    /// Operator-facing message (may differ from the internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("No file selected")]
    NoFileSelected,

    #[error("A run is already in progress")]
    RunInProgress,

    #[error("Selected file is empty")]
    EmptyPayload,

    #[error("File too large: {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Run {run_id} was superseded by a newer selection")]
    Superseded { run_id: RunId },
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, log_level).
fn pipeline_error_static_metadata(
    err: &PipelineError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        PipelineError::UnsupportedMediaType(_) => (
            "UNSUPPORTED_MEDIA_TYPE",
            true,
            Some("Select an image or video file"),
            LogLevel::Warn,
        ),
        PipelineError::NoFileSelected => (
            "NO_FILE_SELECTED",
            true,
            Some("Select a file first"),
            LogLevel::Debug,
        ),
        PipelineError::RunInProgress => (
            "RUN_IN_PROGRESS",
            true,
            Some("Wait for the current run to finish"),
            LogLevel::Debug,
        ),
        PipelineError::EmptyPayload => (
            "EMPTY_PAYLOAD",
            true,
            Some("Select a non-empty file"),
            LogLevel::Warn,
        ),
        PipelineError::PayloadTooLarge { .. } => (
            "PAYLOAD_TOO_LARGE",
            true,
            Some("Select a smaller file"),
            LogLevel::Warn,
        ),
        PipelineError::UploadFailed(_) => (
            "UPLOAD_FAILED",
            true,
            Some("Run the analysis again"),
            LogLevel::Error,
        ),
        PipelineError::AnalysisFailed(_) => (
            "ANALYSIS_FAILED",
            true,
            Some("Select the file again and retry"),
            LogLevel::Error,
        ),
        PipelineError::Superseded { .. } => ("SUPERSEDED", true, None, LogLevel::Debug),
    }
}

impl ErrorMetadata for PipelineError {
    fn error_code(&self) -> &'static str {
        pipeline_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        pipeline_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        pipeline_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        pipeline_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            PipelineError::UnsupportedMediaType(_) => {
                "Unsupported file type. Please upload an image or video.".to_string()
            }
            PipelineError::NoFileSelected => "Please select a file first.".to_string(),
            PipelineError::RunInProgress => "An analysis is already running.".to_string(),
            PipelineError::UploadFailed(_) | PipelineError::AnalysisFailed(_) => {
                "Failed to analyze file.".to_string()
            }
            PipelineError::EmptyPayload
            | PipelineError::PayloadTooLarge { .. }
            | PipelineError::Superseded { .. } => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_upload_failed() {
        let err = PipelineError::UploadFailed("status 500".to_string());
        assert_eq!(err.error_code(), "UPLOAD_FAILED");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to analyze file.");
        assert_eq!(err.log_level(), LogLevel::Error);
        assert_eq!(err.to_string(), "Upload failed: status 500");
    }

    #[test]
    fn test_error_metadata_unsupported_media_type() {
        let err = PipelineError::UnsupportedMediaType("text/plain".to_string());
        assert_eq!(err.error_code(), "UNSUPPORTED_MEDIA_TYPE");
        assert_eq!(err.log_level(), LogLevel::Warn);
        assert!(err.to_string().contains("text/plain"));
    }

    #[test]
    fn test_error_metadata_payload_too_large() {
        let err = PipelineError::PayloadTooLarge {
            size: 2000,
            limit: 1000,
        };
        assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
        assert!(err.client_message().contains("2000"));
        assert!(err.client_message().contains("1000"));
    }

    #[test]
    fn test_every_error_is_recoverable() {
        let errors = [
            PipelineError::UnsupportedMediaType("a/b".to_string()),
            PipelineError::NoFileSelected,
            PipelineError::RunInProgress,
            PipelineError::EmptyPayload,
            PipelineError::PayloadTooLarge { size: 2, limit: 1 },
            PipelineError::UploadFailed("x".to_string()),
            PipelineError::AnalysisFailed("x".to_string()),
            PipelineError::Superseded { run_id: RunId(3) },
        ];
        assert!(errors.iter().all(|e| e.is_recoverable()));
    }
}
