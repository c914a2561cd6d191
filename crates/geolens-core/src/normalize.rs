//! Maps raw analysis-backend payloads into `AnalysisResult`.
//!
//! The backend's response shape is not validated. Every field is read best-effort: a
//! missing field or a field of the wrong type falls back to its default, so
//! `normalize` is total and never returns an error.

use serde_json::{Map, Value as JsonValue};

use crate::models::{
    AnalysisResult, Confidence, ImageAnalysis, MediaCategory, VideoAnalysis, VisualMatch,
    UNKNOWN_LOCATION,
};

/// Normalize a raw payload for the given category. Pure; no I/O.
pub fn normalize(category: MediaCategory, payload: &JsonValue) -> AnalysisResult {
    let empty = Map::new();
    let fields = payload.as_object().unwrap_or(&empty);

    match category {
        MediaCategory::Image => AnalysisResult::Image(normalize_image(fields)),
        MediaCategory::Video => AnalysisResult::Video(normalize_video(fields)),
    }
}

fn normalize_image(fields: &Map<String, JsonValue>) -> ImageAnalysis {
    ImageAnalysis {
        location: parse_location(fields.get("top_location")),
        confidence: parse_confidence(fields.get("confidence")),
        ai_analysis: fields
            .get("ai_analysis")
            .and_then(JsonValue::as_object)
            .cloned()
            .unwrap_or_default(),
        google_lens_results: fields
            .get("google_lens_results")
            .and_then(JsonValue::as_array)
            .map(|items| items.iter().filter_map(parse_visual_match).collect())
            .unwrap_or_default(),
        contextual_text: string_list(fields.get("contextual_text")),
        sources_used: fields
            .get("sources_used")
            .and_then(JsonValue::as_array)
            .cloned()
            .unwrap_or_default(),
    }
}

fn normalize_video(fields: &Map<String, JsonValue>) -> VideoAnalysis {
    VideoAnalysis {
        location: parse_location(fields.get("top_location")),
        frames_analyzed: parse_frame_count(fields.get("frames_analyzed")),
        locations_found: string_list(fields.get("locations_found")),
    }
}

fn parse_location(value: Option<&JsonValue>) -> String {
    value
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_LOCATION)
        .to_string()
}

/// Accepts a number or a numeric string such as `"85"` or `"85%"`.
pub(crate) fn parse_confidence(value: Option<&JsonValue>) -> Confidence {
    let percent = match value {
        Some(JsonValue::Number(n)) => n.as_f64(),
        Some(JsonValue::String(s)) => s
            .trim()
            .trim_end_matches('%')
            .trim_end()
            .parse::<f64>()
            .ok(),
        _ => None,
    };

    percent
        .filter(|p| p.is_finite())
        .map(Confidence::Percent)
        .unwrap_or(Confidence::NotAvailable)
}

fn parse_frame_count(value: Option<&JsonValue>) -> u64 {
    let Some(JsonValue::Number(n)) = value else {
        return 0;
    };

    n.as_u64()
        .or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        })
        .unwrap_or(0)
}

/// Records without a string `link` are dropped; `title` and `thumbnail` are optional.
fn parse_visual_match(item: &JsonValue) -> Option<VisualMatch> {
    let record = item.as_object()?;
    let link = record.get("link")?.as_str()?.to_string();

    Some(VisualMatch {
        title: record
            .get("title")
            .and_then(JsonValue::as_str)
            .map(String::from),
        link,
        thumbnail: record
            .get("thumbnail")
            .and_then(JsonValue::as_str)
            .map(String::from),
    })
}

fn string_list(value: Option<&JsonValue>) -> Vec<String> {
    value
        .and_then(JsonValue::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(JsonValue::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_image_defaults_from_empty_object() {
        let result = normalize(MediaCategory::Image, &json!({}));
        assert_eq!(result, AnalysisResult::Image(ImageAnalysis::default()));

        let AnalysisResult::Image(image) = result else {
            panic!("expected image result");
        };
        assert_eq!(image.location, "Unknown");
        assert_eq!(image.confidence, Confidence::NotAvailable);
        assert!(image.ai_analysis.is_empty());
        assert!(image.google_lens_results.is_empty());
        assert!(image.contextual_text.is_empty());
        assert!(image.sources_used.is_empty());
    }

    #[test]
    fn test_video_defaults_from_empty_object() {
        let result = normalize(MediaCategory::Video, &json!({}));
        assert_eq!(
            result,
            AnalysisResult::Video(VideoAnalysis {
                location: "Unknown".to_string(),
                frames_analyzed: 0,
                locations_found: vec![],
            })
        );
    }

    #[test]
    fn test_image_location_and_confidence() {
        let result = normalize(
            MediaCategory::Image,
            &json!({ "top_location": "Paris", "confidence": 92 }),
        );
        assert_eq!(serde_json::to_value(&result).unwrap()["confidence"], json!(92));
        let AnalysisResult::Image(image) = result else {
            panic!("expected image result");
        };
        assert_eq!(image.location, "Paris");
        assert_eq!(image.confidence, Confidence::Percent(92.0));
    }

    #[test]
    fn test_full_image_payload() {
        let payload = json!({
            "status": "success",
            "top_location": "Kyoto, Japan",
            "confidence": "87%",
            "ai_analysis": {
                "top_location_guesses": ["Kyoto, Japan", "Nara, Japan"],
                "reasoning": "Torii gates"
            },
            "google_lens_results": [
                { "title": "Fushimi Inari", "link": "https://a", "thumbnail": "https://a/t.jpg" },
                { "link": "https://b" },
                { "title": "no link" },
                "garbage"
            ],
            "contextual_text": ["Summary", 3, null],
            "sources_used": ["lens", { "kind": "ocr" }]
        });

        let AnalysisResult::Image(image) = normalize(MediaCategory::Image, &payload) else {
            panic!("expected image result");
        };
        assert_eq!(image.location, "Kyoto, Japan");
        assert_eq!(image.confidence, Confidence::Percent(87.0));
        assert_eq!(image.ai_analysis["reasoning"], json!("Torii gates"));
        assert_eq!(
            image.google_lens_results,
            vec![
                VisualMatch {
                    title: Some("Fushimi Inari".to_string()),
                    link: "https://a".to_string(),
                    thumbnail: Some("https://a/t.jpg".to_string()),
                },
                VisualMatch {
                    title: None,
                    link: "https://b".to_string(),
                    thumbnail: None,
                },
            ]
        );
        assert_eq!(image.contextual_text, vec!["Summary".to_string()]);
        assert_eq!(image.sources_used.len(), 2);
    }

    #[test]
    fn test_wrong_types_degrade_to_defaults() {
        let payload = json!({
            "top_location": 42,
            "confidence": "very high",
            "ai_analysis": null,
            "google_lens_results": { "title": "x" },
            "contextual_text": "not a list",
            "sources_used": 7
        });
        assert_eq!(
            normalize(MediaCategory::Image, &payload),
            AnalysisResult::Image(ImageAnalysis::default())
        );

        let payload = json!({
            "top_location": "",
            "frames_analyzed": -3,
            "locations_found": [1, "Lisbon"]
        });
        assert_eq!(
            normalize(MediaCategory::Video, &payload),
            AnalysisResult::Video(VideoAnalysis {
                location: "Unknown".to_string(),
                frames_analyzed: 0,
                locations_found: vec!["Lisbon".to_string()],
            })
        );
    }

    #[test]
    fn test_frame_count_accepts_integral_floats() {
        let AnalysisResult::Video(video) =
            normalize(MediaCategory::Video, &json!({ "frames_analyzed": 12.0 }))
        else {
            panic!("expected video result");
        };
        assert_eq!(video.frames_analyzed, 12);

        let AnalysisResult::Video(video) =
            normalize(MediaCategory::Video, &json!({ "frames_analyzed": 2.5 }))
        else {
            panic!("expected video result");
        };
        assert_eq!(video.frames_analyzed, 0);
    }

    #[test]
    fn test_non_object_payloads_are_total() {
        for payload in [json!(null), json!([]), json!("text"), json!(3)] {
            assert_eq!(normalize(MediaCategory::Image, &payload).category(), MediaCategory::Image);
            assert_eq!(
                normalize(MediaCategory::Video, &payload),
                AnalysisResult::Video(VideoAnalysis::default())
            );
        }
    }

    #[test]
    fn test_variant_follows_category_not_payload_shape() {
        // A video-shaped payload normalized as an image stays an image.
        let payload = json!({ "top_location": "Oslo", "frames_analyzed": 9 });
        let result = normalize(MediaCategory::Image, &payload);
        assert_eq!(result.category(), MediaCategory::Image);
        assert_eq!(result.location(), "Oslo");
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let payload = json!({
            "top_location": "Cairo",
            "confidence": 71.5,
            "google_lens_results": [{ "link": "https://c" }]
        });
        assert_eq!(
            normalize(MediaCategory::Image, &payload),
            normalize(MediaCategory::Image, &payload)
        );
    }
}
