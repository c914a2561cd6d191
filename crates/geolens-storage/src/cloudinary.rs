use crate::traits::{MediaUploader, StorageError, StorageResult};
use async_trait::async_trait;
use geolens_core::{MediaAsset, StorageSettings, UploadedReference};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

/// Cloudinary (unsigned preset) upload implementation
#[derive(Clone, Debug)]
pub struct CloudinaryUploader {
    client: Client,
    settings: StorageSettings,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    secure_url: Option<String>,
}

impl CloudinaryUploader {
    /// Create a new CloudinaryUploader
    ///
    /// The HTTP client only gets a timeout when `settings.timeout` is set.
    pub fn new(settings: StorageSettings) -> StorageResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            StorageError::ConfigError(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &StorageSettings {
        &self.settings
    }

    fn build_form(&self, asset: MediaAsset) -> StorageResult<Form> {
        let filename = asset.filename().to_string();
        let content_type = asset.content_type().to_string();

        let part = Part::bytes(asset.into_data())
            .file_name(filename)
            .mime_str(&content_type)
            .map_err(|e| {
                StorageError::Request(format!("invalid content type {}: {}", content_type, e))
            })?;

        Ok(Form::new()
            .part("file", part)
            .text("upload_preset", self.settings.upload_preset.clone()))
    }
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    #[tracing::instrument(
        skip(self, asset),
        fields(
            category = %asset.category(),
            filename = %asset.filename(),
            size = asset.size()
        )
    )]
    async fn upload(&self, asset: MediaAsset) -> StorageResult<UploadedReference> {
        if asset.size() == 0 {
            return Err(StorageError::EmptyPayload);
        }

        let category = asset.category();
        let url = self.settings.upload_url(category);
        let form = self.build_form(asset)?;

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(status = status.as_u16(), "Upload rejected by storage");
            return Err(StorageError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;

        let secure_url = body
            .secure_url
            .filter(|u| !u.trim().is_empty())
            .ok_or(StorageError::MissingUrl)?;

        tracing::info!(url = %secure_url, "Media uploaded");

        Ok(UploadedReference {
            url: secure_url,
            category,
        })
    }

    fn backend_name(&self) -> &'static str {
        "cloudinary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geolens_core::validation::classify_file;
    use geolens_core::{MediaCategory, SelectedFile};
    use mockito::Matcher;

    fn settings(base_url: String) -> StorageSettings {
        StorageSettings {
            base_url,
            cloud_name: "demo".to_string(),
            upload_preset: "unsigned".to_string(),
            timeout: None,
        }
    }

    fn asset(content_type: &str, data: &[u8]) -> MediaAsset {
        classify_file(SelectedFile::new("shot.jpg", content_type, data.to_vec())).unwrap()
    }

    #[tokio::test]
    async fn test_upload_image_returns_secure_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/demo/image/upload")
            .match_header("content-type", Matcher::Regex("multipart/form-data".to_string()))
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="upload_preset""#.to_string()),
                Matcher::Regex("unsigned".to_string()),
                Matcher::Regex(r#"name="file"; filename="shot.jpg""#.to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"secure_url":"https://x/img.jpg","url":"http://x/img.jpg"}"#)
            .create_async()
            .await;

        let uploader = CloudinaryUploader::new(settings(server.url())).unwrap();
        let reference = uploader
            .upload(asset("image/jpeg", b"jpegbytes"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            reference,
            UploadedReference {
                url: "https://x/img.jpg".to_string(),
                category: MediaCategory::Image,
            }
        );
    }

    #[tokio::test]
    async fn test_upload_video_uses_video_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let image_mock = server
            .mock("POST", "/demo/image/upload")
            .expect(0)
            .create_async()
            .await;
        let video_mock = server
            .mock("POST", "/demo/video/upload")
            .with_status(200)
            .with_body(r#"{"secure_url":"https://x/clip.mp4"}"#)
            .create_async()
            .await;

        let uploader = CloudinaryUploader::new(settings(server.url())).unwrap();
        let reference = uploader.upload(asset("video/mp4", b"mp4")).await.unwrap();

        video_mock.assert_async().await;
        image_mock.assert_async().await;
        assert_eq!(reference.category, MediaCategory::Video);
    }

    #[tokio::test]
    async fn test_upload_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/demo/image/upload")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let uploader = CloudinaryUploader::new(settings(server.url())).unwrap();
        let err = uploader
            .upload(asset("image/png", b"png"))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Status { status: 500, .. }));
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_upload_missing_secure_url() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/demo/image/upload")
            .with_status(200)
            .with_body(r#"{"url":"http://x/img.jpg"}"#)
            .create_async()
            .await;

        let uploader = CloudinaryUploader::new(settings(server.url())).unwrap();
        let err = uploader
            .upload(asset("image/png", b"png"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::MissingUrl));
    }

    #[tokio::test]
    async fn test_upload_non_json_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/demo/image/upload")
            .with_status(200)
            .with_body("<html>ok</html>")
            .create_async()
            .await;

        let uploader = CloudinaryUploader::new(settings(server.url())).unwrap();
        let err = uploader
            .upload(asset("image/png", b"png"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_upload_empty_payload_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let uploader = CloudinaryUploader::new(settings(server.url())).unwrap();
        let err = uploader.upload(asset("image/png", b"")).await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, StorageError::EmptyPayload));
    }

    #[tokio::test]
    async fn test_upload_unreachable_host() {
        let uploader =
            CloudinaryUploader::new(settings("http://127.0.0.1:1".to_string())).unwrap();
        let err = uploader
            .upload(asset("image/png", b"png"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Request(_)));
    }
}
