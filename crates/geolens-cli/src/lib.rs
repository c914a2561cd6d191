use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use geolens_core::{AnalysisResult, GeolensConfig, PipelineState, SelectedFile};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Declared content type for a local file, guessed from its extension.
pub fn guess_content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Read a local file into a selection. The declared type is `content_type` when
/// given, otherwise it is guessed from the extension.
pub async fn load_selection(path: &Path, content_type: Option<String>) -> anyhow::Result<SelectedFile> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    let content_type = content_type.unwrap_or_else(|| guess_content_type(path));

    Ok(SelectedFile::new(filename, content_type, data))
}

/// Log each published phase until every sender is dropped. The task yields the
/// phases it observed; intermediate states may be coalesced but the last one is
/// always seen.
pub fn spawn_phase_logger(
    mut rx: watch::Receiver<PipelineState>,
) -> JoinHandle<Vec<&'static str>> {
    tokio::spawn(async move {
        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            let phase = rx.borrow_and_update().phase();
            tracing::info!(phase, "Pipeline state changed");
            seen.push(phase);
        }
        seen
    })
}

/// Effective configuration for display. The upload preset is partially masked.
pub fn config_summary(config: &GeolensConfig) -> serde_json::Value {
    let preset = &config.storage_upload_preset;
    let masked_preset = if preset.chars().count() > 2 {
        format!("{}***", preset.chars().take(2).collect::<String>())
    } else {
        "***".to_string()
    };

    serde_json::json!({
        "environment": config.environment,
        "storage_base_url": config.storage_base_url,
        "storage_cloud_name": config.storage_cloud_name,
        "storage_upload_preset": masked_preset,
        "analysis_base_url": config.analysis_base_url,
        "max_image_size_bytes": config.max_image_size_bytes,
        "max_video_size_bytes": config.max_video_size_bytes,
        "http_timeout_secs": config.http_timeout_secs,
    })
}

/// Human-readable report of an analysis result.
pub fn render_result(result: &AnalysisResult) -> String {
    let mut out = String::from("Analysis Results\n");

    match result {
        AnalysisResult::Image(image) => {
            let _ = writeln!(out, "Predicted Location: {}", image.location);
            let _ = writeln!(out, "Confidence Score: {}", image.confidence);

            out.push_str("\nGoogle Lens Matches\n");
            if image.google_lens_results.is_empty() {
                out.push_str("  No matches found.\n");
            }
            for item in &image.google_lens_results {
                let title = item.title.as_deref().unwrap_or("Google Lens Match");
                let _ = writeln!(out, "  - {} <{}>", truncate_string(title, 60), item.link);
            }

            out.push_str("\nContextual Analysis\n");
            if image.contextual_text.is_empty() {
                out.push_str("  No additional context available.\n");
            }
            for text in &image.contextual_text {
                let _ = writeln!(out, "  - {}", text);
            }

            out.push_str("\nSources Used\n");
            if image.sources_used.is_empty() {
                out.push_str("  No sources reported.\n");
            }
            for source in &image.sources_used {
                match source.as_str() {
                    Some(text) => {
                        let _ = writeln!(out, "  - {}", text);
                    }
                    None => {
                        let _ = writeln!(out, "  - {}", source);
                    }
                }
            }

            out.push_str("\nAI Analysis\n");
            if image.ai_analysis.is_empty() {
                out.push_str("  No AI analysis available.\n");
            } else {
                let pretty = serde_json::to_string_pretty(&image.ai_analysis)
                    .unwrap_or_else(|_| "{}".to_string());
                for line in pretty.lines() {
                    let _ = writeln!(out, "  {}", line);
                }
            }
        }
        AnalysisResult::Video(video) => {
            let _ = writeln!(out, "Predicted Location from Video: {}", video.location);
            let _ = writeln!(out, "Frames Analyzed: {}", video.frames_analyzed);

            out.push_str("\nLocations Found in Frames\n");
            if video.locations_found.is_empty() {
                out.push_str("  No clear location detected.\n");
            }
            for location in &video.locations_found {
                let _ = writeln!(out, "  - {}", location);
            }
        }
    }

    out
}

/// Initialize tracing for the CLI binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
