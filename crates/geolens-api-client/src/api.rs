//! Analysis submission for the GeoLens backend.
//!
//! One request per run, to exactly one of the two endpoints. The payload is returned
//! unnormalized; `geolens_core::normalize` maps it afterwards.

use async_trait::async_trait;
use geolens_core::{AnalysisRequest, UploadedReference};
use serde_json::Value as JsonValue;

use crate::{AnalysisClient, AnalysisClientError};

/// Analysis backend abstraction.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Submit a durable URL for analysis and return the raw backend payload.
    async fn submit(&self, reference: &UploadedReference) -> Result<JsonValue, AnalysisClientError>;
}

#[async_trait]
impl AnalysisBackend for AnalysisClient {
    #[tracing::instrument(skip(self, reference), fields(category = %reference.category, url = %reference.url))]
    async fn submit(&self, reference: &UploadedReference) -> Result<JsonValue, AnalysisClientError> {
        let request = AnalysisRequest::from(reference);
        let url = self.settings().analyze_url(request.category());

        let payload = self.post_json(&url, &request).await?;

        // The backend reports its own failures as {"status": "failed", "error": ...}.
        if payload.get("status").and_then(JsonValue::as_str) == Some("failed") {
            let message = payload
                .get("error")
                .and_then(JsonValue::as_str)
                .unwrap_or("unknown backend error")
                .to_string();
            return Err(AnalysisClientError::Backend(message));
        }

        tracing::info!("Analysis payload received");
        Ok(payload)
    }
}
