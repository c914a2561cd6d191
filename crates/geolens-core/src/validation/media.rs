//! Selection-time classification and pre-upload payload checks.
//!
//! Classification trusts the declared content type exactly. File contents are never
//! sniffed, so a misreported or malicious type is not detected here; anything that
//! consumes the durable URL must treat the media as untrusted.

use crate::error::PipelineError;
use crate::models::{MediaAsset, MediaCategory, SelectedFile};

pub const BYTES_PER_MB: usize = 1024 * 1024;
pub const DEFAULT_MAX_IMAGE_SIZE_MB: usize = 10;
pub const DEFAULT_MAX_VIDEO_SIZE_MB: usize = 100;

/// Classify a declared content type as image or video.
pub fn classify_content_type(content_type: &str) -> Result<MediaCategory, PipelineError> {
    let normalized = content_type.trim().to_ascii_lowercase();

    if normalized.starts_with("image/") {
        Ok(MediaCategory::Image)
    } else if normalized.starts_with("video/") {
        Ok(MediaCategory::Video)
    } else {
        Err(PipelineError::UnsupportedMediaType(content_type.to_string()))
    }
}

/// Turn an operator's selection into a `MediaAsset`, classifying it exactly once.
pub fn classify_file(file: SelectedFile) -> Result<MediaAsset, PipelineError> {
    let category = classify_content_type(&file.content_type)?;
    Ok(MediaAsset::new(
        file.filename,
        file.content_type,
        category,
        file.data,
    ))
}

/// Per-category upper bounds on payload size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimits {
    pub max_image_bytes: usize,
    pub max_video_bytes: usize,
}

impl SizeLimits {
    pub fn limit_for(&self, category: MediaCategory) -> usize {
        match category {
            MediaCategory::Image => self.max_image_bytes,
            MediaCategory::Video => self.max_video_bytes,
        }
    }
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_SIZE_MB * BYTES_PER_MB,
            max_video_bytes: DEFAULT_MAX_VIDEO_SIZE_MB * BYTES_PER_MB,
        }
    }
}

/// Check that an asset is non-empty and within the limit for its category.
pub fn validate_payload_size(asset: &MediaAsset, limits: &SizeLimits) -> Result<(), PipelineError> {
    let size = asset.size();
    if size == 0 {
        return Err(PipelineError::EmptyPayload);
    }

    let limit = limits.limit_for(asset.category());
    if size > limit {
        return Err(PipelineError::PayloadTooLarge { size, limit });
    }

    Ok(())
}
