//! Validation modules

pub mod media;

pub use media::{
    classify_content_type, classify_file, validate_payload_size, SizeLimits, BYTES_PER_MB,
    DEFAULT_MAX_IMAGE_SIZE_MB, DEFAULT_MAX_VIDEO_SIZE_MB,
};
