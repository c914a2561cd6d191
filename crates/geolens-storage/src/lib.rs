//! GeoLens Storage Library
//!
//! This crate provides the upload coordinator: the `MediaUploader` trait and an
//! implementation for Cloudinary-compatible unsigned upload endpoints.
//!
//! # Endpoint layout
//!
//! Images and videos go to distinct sub-endpoints of the same cloud:
//!
//! - **Images**: `{base_url}/{cloud_name}/image/upload`
//! - **Videos**: `{base_url}/{cloud_name}/video/upload`
//!
//! Each upload is a single multipart request with `file` and `upload_preset` fields.
//! The durable URL is read from the `secure_url` field of the response.

pub mod cloudinary;
pub mod factory;
pub mod traits;

// Re-export commonly used types
pub use cloudinary::CloudinaryUploader;
pub use factory::create_uploader;
pub use traits::{MediaUploader, StorageError, StorageResult};
