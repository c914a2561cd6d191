//! Data models for the pipeline
//!
//! Each sub-module covers one stage of a run: what the operator selected, what the
//! analysis backend returned, and the state the orchestrator publishes.

mod analysis;
mod media;
mod pipeline;

// Re-export all models for convenient imports
pub use analysis::*;
pub use media::*;
pub use pipeline::*;
