use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use super::analysis::AnalysisResult;
use super::media::MediaCategory;
use crate::error::{ErrorMetadata, PipelineError};

/// Monotonic run generation. A run may only publish state while its id is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl RunId {
    pub fn next(self) -> RunId {
        RunId(self.0.wrapping_add(1))
    }
}

impl Display for RunId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// User-displayable projection of a `PipelineError`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
    pub detail: String,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl From<&PipelineError> for ErrorInfo {
    fn from(err: &PipelineError) -> Self {
        Self {
            code: err.error_code().to_string(),
            message: err.client_message(),
            detail: err.to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action().map(String::from),
        }
    }
}

/// State published by the orchestrator. Observers read it; only the orchestrator writes it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PipelineState {
    #[default]
    Idle,
    FileSelected {
        filename: String,
        category: MediaCategory,
    },
    Uploading {
        run_id: RunId,
    },
    Analyzing {
        run_id: RunId,
    },
    Succeeded {
        run_id: RunId,
        result: AnalysisResult,
    },
    Failed {
        error: ErrorInfo,
    },
}

impl PipelineState {
    pub fn phase(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::FileSelected { .. } => "file_selected",
            PipelineState::Uploading { .. } => "uploading",
            PipelineState::Analyzing { .. } => "analyzing",
            PipelineState::Succeeded { .. } => "succeeded",
            PipelineState::Failed { .. } => "failed",
        }
    }

    /// Whether a network stage is currently suspended.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            PipelineState::Uploading { .. } | PipelineState::Analyzing { .. }
        )
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            PipelineState::Succeeded { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            PipelineState::Failed { error } => Some(error),
            _ => None,
        }
    }
}
