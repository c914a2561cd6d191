use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use std::fmt::{Display, Formatter, Result as FmtResult};

use super::media::{MediaCategory, UploadedReference};

/// Location name used whenever the backend does not provide one.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// 2^53, the bound below which every whole `f64` is an exact integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Request body for the analysis backend. Serializes to `{"image_url": ...}` or
/// `{"video_url": ...}`; the variant follows the uploaded reference's category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisRequest {
    Image { image_url: String },
    Video { video_url: String },
}

impl AnalysisRequest {
    pub fn category(&self) -> MediaCategory {
        match self {
            AnalysisRequest::Image { .. } => MediaCategory::Image,
            AnalysisRequest::Video { .. } => MediaCategory::Video,
        }
    }
}

impl From<&UploadedReference> for AnalysisRequest {
    fn from(reference: &UploadedReference) -> Self {
        match reference.category {
            MediaCategory::Image => AnalysisRequest::Image {
                image_url: reference.url.clone(),
            },
            MediaCategory::Video => AnalysisRequest::Video {
                video_url: reference.url.clone(),
            },
        }
    }
}

/// Confidence score on a percentage scale, or `N/A` when the backend gave none.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Confidence {
    Percent(f64),
    #[default]
    NotAvailable,
}

impl Display for Confidence {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Confidence::Percent(p) => write!(f, "{}%", p),
            Confidence::NotAvailable => f.write_str("N/A"),
        }
    }
}

impl Serialize for Confidence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Whole numbers go back out as integers, as the backend sent them.
            Confidence::Percent(p) if p.fract() == 0.0 && p.abs() < MAX_EXACT_INTEGER => {
                serializer.serialize_i64(*p as i64)
            }
            Confidence::Percent(p) => serializer.serialize_f64(*p),
            Confidence::NotAvailable => serializer.serialize_str("N/A"),
        }
    }
}

impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        Ok(crate::normalize::parse_confidence(Some(&value)))
    }
}

/// One visual-match record from the reverse image search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualMatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    pub location: String,
    pub confidence: Confidence,
    pub ai_analysis: Map<String, JsonValue>,
    pub google_lens_results: Vec<VisualMatch>,
    pub contextual_text: Vec<String>,
    pub sources_used: Vec<JsonValue>,
}

impl Default for ImageAnalysis {
    fn default() -> Self {
        Self {
            location: UNKNOWN_LOCATION.to_string(),
            confidence: Confidence::NotAvailable,
            ai_analysis: Map::new(),
            google_lens_results: Vec::new(),
            contextual_text: Vec::new(),
            sources_used: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoAnalysis {
    pub location: String,
    pub frames_analyzed: u64,
    pub locations_found: Vec<String>,
}

impl Default for VideoAnalysis {
    fn default() -> Self {
        Self {
            location: UNKNOWN_LOCATION.to_string(),
            frames_analyzed: 0,
            locations_found: Vec::new(),
        }
    }
}

/// Normalized analysis result. The `type` tag always matches the run's category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnalysisResult {
    Image(ImageAnalysis),
    Video(VideoAnalysis),
}

impl AnalysisResult {
    pub fn category(&self) -> MediaCategory {
        match self {
            AnalysisResult::Image(_) => MediaCategory::Image,
            AnalysisResult::Video(_) => MediaCategory::Video,
        }
    }

    pub fn location(&self) -> &str {
        match self {
            AnalysisResult::Image(image) => &image.location,
            AnalysisResult::Video(video) => &video.location,
        }
    }
}
