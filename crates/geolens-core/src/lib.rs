//! GeoLens Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration, validation
//! and result normalization shared by every GeoLens component. It performs no I/O
//! apart from reading configuration from the environment.

pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod validation;

// Re-export commonly used types
pub use config::{AnalysisSettings, GeolensConfig, StorageSettings};
pub use error::{ErrorMetadata, LogLevel, PipelineError};
pub use models::{
    AnalysisRequest, AnalysisResult, Confidence, ErrorInfo, ImageAnalysis, MediaAsset,
    MediaCategory, PipelineState, RunId, SelectedFile, UploadedReference, VideoAnalysis,
    VisualMatch,
};
pub use normalize::normalize;
