//! Orchestration of a GeoLens run: select, upload, analyze, normalize.
//!
//! The [`Orchestrator`] is the single owner of [`PipelineState`]. Presentation code
//! drives it through [`Orchestrator::select_file`] and [`Orchestrator::run_pipeline`]
//! and observes it through [`Orchestrator::subscribe`].
//!
//! [`PipelineState`]: geolens_core::PipelineState

pub mod orchestrator;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use orchestrator::Orchestrator;
