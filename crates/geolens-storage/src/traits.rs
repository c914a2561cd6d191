//! Upload abstraction trait
//!
//! This module defines the `MediaUploader` trait that every object-storage backend
//! must implement.

use async_trait::async_trait;
use geolens_core::{MediaAsset, UploadedReference};
use thiserror::Error;

/// Upload operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("payload is empty")]
    EmptyPayload,

    #[error("request failed: {0}")]
    Request(String),

    #[error("storage returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid storage response: {0}")]
    InvalidResponse(String),

    #[error("storage response has no secure_url")]
    MissingUrl,

    #[error("configuration error: {0}")]
    ConfigError(String),
}

/// Result type for upload operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Upload abstraction trait
///
/// The orchestrator only depends on this trait, so tests and alternative
/// object stores can stand in for the Cloudinary backend.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// Upload an asset and return its durable URL.
    ///
    /// The asset is consumed: its payload is released as soon as the call returns,
    /// whether or not the upload succeeded. The returned reference carries the
    /// asset's category. Implementations perform exactly one network call and never
    /// retry.
    async fn upload(&self, asset: MediaAsset) -> StorageResult<UploadedReference>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}
