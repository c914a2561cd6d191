//! HTTP client for the analysis backend.
//!
//! Provides a minimal JSON client for the two analysis endpoints (`/analyze` for
//! images, `/analyze_video` for videos) and the `AnalysisBackend` trait the
//! orchestrator depends on.

pub mod api;

use geolens_core::AnalysisSettings;
use reqwest::Client;
use serde_json::Value as JsonValue;

pub use api::AnalysisBackend;

/// Analysis request errors
#[derive(Debug, thiserror::Error)]
pub enum AnalysisClientError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("backend reported failure: {0}")]
    Backend(String),

    #[error("invalid backend response: {0}")]
    InvalidResponse(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// HTTP client for the analysis backend.
#[derive(Clone, Debug)]
pub struct AnalysisClient {
    client: Client,
    settings: AnalysisSettings,
}

impl AnalysisClient {
    /// The client only gets a timeout when `settings.timeout` is set.
    pub fn new(settings: AnalysisSettings) -> Result<Self, AnalysisClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AnalysisClientError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// POST a JSON body and return the raw JSON response.
    ///
    /// Non-2xx statuses become `Status` errors carrying the body's `error` field when
    /// present, the raw body otherwise.
    pub async fn post_json<B: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<JsonValue, AnalysisClientError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| AnalysisClientError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AnalysisClientError::Status {
                status: status.as_u16(),
                message: error_message(&error_text),
            });
        }

        response
            .json()
            .await
            .map_err(|e| AnalysisClientError::InvalidResponse(e.to_string()))
    }
}

/// Pull the `error` field out of a JSON error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<JsonValue>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(JsonValue::as_str).map(String::from))
        .unwrap_or_else(|| body.to_string())
}
