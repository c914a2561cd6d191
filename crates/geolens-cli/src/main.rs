//! Geolens CLI: run a local image or video through the upload and analysis pipeline.
//!
//! Set STORAGE_CLOUD_NAME and STORAGE_UPLOAD_PRESET. ANALYSIS_BASE_URL defaults to
//! http://localhost:5001.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use geolens_cli::{
    config_summary, init_tracing, load_selection, render_result, spawn_phase_logger,
};
use geolens_core::GeolensConfig;
use geolens_pipeline::Orchestrator;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "geolens", about = "Media location analysis CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file and analyze where it was taken
    Analyze {
        /// Path to the image or video
        file: std::path::PathBuf,
        /// Override the declared content type (guessed from the extension otherwise)
        #[arg(long)]
        content_type: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Show the effective configuration
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let config = GeolensConfig::from_env().context(
        "Failed to load configuration. Set STORAGE_CLOUD_NAME and STORAGE_UPLOAD_PRESET",
    )?;

    match cli.command {
        Commands::Analyze {
            file,
            content_type,
            format,
        } => {
            let orchestrator = Orchestrator::from_config(&config)?;
            let selection = load_selection(&file, content_type).await?;

            let logger = spawn_phase_logger(orchestrator.subscribe());

            let outcome = match orchestrator.select_file(selection) {
                Ok(_) => orchestrator.run_pipeline().await,
                Err(e) => Err(e),
            };
            let final_state = orchestrator.state();

            // Closing the channel lets the logger report the last transition and exit.
            drop(orchestrator);
            let _ = logger.await;

            match outcome {
                Ok(result) => match format {
                    OutputFormat::Text => print!("{}", render_result(&result)),
                    OutputFormat::Json => print_json(&result)?,
                },
                Err(e) => {
                    if let Some(info) = final_state.error() {
                        print_json(info)?;
                    }
                    return Err(e).context(format!("Analysis of {} failed", file.display()));
                }
            }
        }
        Commands::Config => {
            print_json(&config_summary(&config))?;
        }
    }

    Ok(())
}
