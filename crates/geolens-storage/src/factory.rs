use crate::{CloudinaryUploader, MediaUploader, StorageResult};
use geolens_core::GeolensConfig;
use std::sync::Arc;

/// Create the upload backend based on configuration
pub fn create_uploader(config: &GeolensConfig) -> StorageResult<Arc<dyn MediaUploader>> {
    let uploader = CloudinaryUploader::new(config.storage_settings())?;
    tracing::debug!(
        backend = uploader.backend_name(),
        cloud_name = %uploader.settings().cloud_name,
        "Upload backend created"
    );
    Ok(Arc::new(uploader))
}
