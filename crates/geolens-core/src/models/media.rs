use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Media category, decided once from the declared content type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Image,
    Video,
}

impl MediaCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaCategory::Image => "image",
            MediaCategory::Video => "video",
        }
    }
}

impl Display for MediaCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A file handed over by the presentation layer, not yet classified.
#[derive(Clone)]
pub struct SelectedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl SelectedFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }
}

impl std::fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SelectedFile")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size", &self.data.len())
            .finish()
    }
}

/// A classified selection. The category is fixed at construction and cannot change.
///
/// Only `validation::classify_file` builds one, so holding a `MediaAsset` means the
/// declared type has already been accepted.
#[derive(Clone)]
pub struct MediaAsset {
    filename: String,
    content_type: String,
    category: MediaCategory,
    data: Vec<u8>,
}

impl MediaAsset {
    pub(crate) fn new(
        filename: String,
        content_type: String,
        category: MediaCategory,
        data: Vec<u8>,
    ) -> Self {
        Self {
            filename,
            content_type,
            category,
            data,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn category(&self) -> MediaCategory {
        self.category
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Consume the asset, handing the payload to the uploader.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl std::fmt::Debug for MediaAsset {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MediaAsset")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("category", &self.category)
            .field("size", &self.data.len())
            .finish()
    }
}

/// Durable URL returned by object storage, tagged with the category that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedReference {
    pub url: String,
    pub category: MediaCategory,
}
