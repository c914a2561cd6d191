//! Configuration module
//!
//! This module provides the configuration for the object-storage upload endpoint, the
//! analysis backend, and the pre-upload size policy. Values come from the process
//! environment (after loading a `.env` file if present).

use std::env;
use std::time::Duration;

use crate::models::MediaCategory;
use crate::validation::{
    SizeLimits, BYTES_PER_MB, DEFAULT_MAX_IMAGE_SIZE_MB, DEFAULT_MAX_VIDEO_SIZE_MB,
};

// Common constants
const STORAGE_BASE_URL: &str = "https://api.cloudinary.com/v1_1";
const ANALYSIS_BASE_URL: &str = "http://localhost:5001";

/// Object-storage settings used by the upload coordinator
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageSettings {
    pub base_url: String,
    pub cloud_name: String,
    pub upload_preset: String,
    pub timeout: Option<Duration>,
}

impl StorageSettings {
    /// Upload endpoint for a category, e.g. `{base}/{cloud}/image/upload`.
    pub fn upload_url(&self, category: MediaCategory) -> String {
        format!(
            "{}/{}/{}/upload",
            self.base_url.trim_end_matches('/'),
            self.cloud_name,
            category.as_str()
        )
    }
}

/// Analysis backend settings used by the analysis submitter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisSettings {
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl AnalysisSettings {
    /// Analysis endpoint for a category: `/analyze` for images, `/analyze_video` for videos.
    pub fn analyze_url(&self, category: MediaCategory) -> String {
        let path = match category {
            MediaCategory::Image => "/analyze",
            MediaCategory::Video => "/analyze_video",
        };
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct GeolensConfig {
    pub environment: String,
    pub storage_base_url: String,
    pub storage_cloud_name: String,
    pub storage_upload_preset: String,
    pub analysis_base_url: String,
    pub max_image_size_bytes: usize,
    pub max_video_size_bytes: usize,
    /// Client-side HTTP timeout. `None` leaves the network calls unbounded.
    pub http_timeout_secs: Option<u64>,
}

impl GeolensConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `from_env` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let max_image_size_mb = var("MAX_IMAGE_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_IMAGE_SIZE_MB);

        let max_video_size_mb = var("MAX_VIDEO_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_VIDEO_SIZE_MB);

        let config = GeolensConfig {
            environment,
            storage_base_url: var("STORAGE_BASE_URL")
                .unwrap_or_else(|| STORAGE_BASE_URL.to_string()),
            storage_cloud_name: var("STORAGE_CLOUD_NAME").unwrap_or_default(),
            storage_upload_preset: var("STORAGE_UPLOAD_PRESET").unwrap_or_default(),
            analysis_base_url: var("ANALYSIS_BASE_URL")
                .unwrap_or_else(|| ANALYSIS_BASE_URL.to_string()),
            max_image_size_bytes: max_image_size_mb.saturating_mul(BYTES_PER_MB),
            max_video_size_bytes: max_video_size_mb.saturating_mul(BYTES_PER_MB),
            http_timeout_secs: var("HTTP_TIMEOUT_SECS")
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|&s| s > 0),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.storage_cloud_name.is_empty() {
            return Err(anyhow::anyhow!("STORAGE_CLOUD_NAME must be set"));
        }

        if self.storage_upload_preset.is_empty() {
            return Err(anyhow::anyhow!("STORAGE_UPLOAD_PRESET must be set"));
        }

        for (name, url) in [
            ("STORAGE_BASE_URL", &self.storage_base_url),
            ("ANALYSIS_BASE_URL", &self.analysis_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow::anyhow!("{} must be an http(s) URL", name));
            }
        }

        if self.is_production() && !self.storage_base_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "STORAGE_BASE_URL must use https in production"
            ));
        }

        if self.max_image_size_bytes == 0 || self.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_IMAGE_SIZE_MB and MAX_VIDEO_SIZE_MB must be greater than zero"
            ));
        }

        Ok(())
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }

    pub fn storage_settings(&self) -> StorageSettings {
        StorageSettings {
            base_url: self.storage_base_url.clone(),
            cloud_name: self.storage_cloud_name.clone(),
            upload_preset: self.storage_upload_preset.clone(),
            timeout: self.http_timeout(),
        }
    }

    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            base_url: self.analysis_base_url.clone(),
            timeout: self.http_timeout(),
        }
    }

    pub fn size_limits(&self) -> SizeLimits {
        SizeLimits {
            max_image_bytes: self.max_image_size_bytes,
            max_video_bytes: self.max_video_size_bytes,
        }
    }
}
