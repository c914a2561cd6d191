//! Pipeline state machine.
//!
//! `Idle → FileSelected → Uploading → Analyzing → {Succeeded | Failed}`. A new
//! selection always lands in `FileSelected`; `reset` returns to `Idle`.
//!
//! The selected asset stays held until its upload succeeds. A run that fails before
//! that point can be started again from `Failed` without selecting again.
//!
//! Staleness: every selection or reset advances the run generation. A run remembers
//! the generation it started under and re-checks it before each state write, so a
//! run that was superseded while suspended on a network call never touches the
//! published state. The network call itself is not aborted.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Context;
use tokio::sync::watch;

use geolens_api_client::{AnalysisBackend, AnalysisClient};
use geolens_core::validation::{classify_file, validate_payload_size, SizeLimits};
use geolens_core::{
    normalize, AnalysisResult, ErrorInfo, ErrorMetadata, GeolensConfig, LogLevel, MediaAsset,
    MediaCategory, PipelineError, PipelineState, RunId, SelectedFile,
};
use geolens_storage::{create_uploader, MediaUploader};

/// Mutable bookkeeping guarded by one lock. Never held across an `.await`.
struct Shared {
    generation: RunId,
    /// Held from selection until an upload of it succeeds.
    asset: Option<MediaAsset>,
}

struct Inner {
    uploader: Arc<dyn MediaUploader>,
    analysis: Arc<dyn AnalysisBackend>,
    limits: SizeLimits,
    shared: Mutex<Shared>,
    state_tx: watch::Sender<PipelineState>,
}

/// Drives one run at a time and owns the published `PipelineState`.
///
/// Cloning is cheap and every clone drives the same state machine, so a UI can
/// hand one clone to the task running the pipeline and keep another for new
/// selections.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl Orchestrator {
    pub fn new(
        uploader: Arc<dyn MediaUploader>,
        analysis: Arc<dyn AnalysisBackend>,
        limits: SizeLimits,
    ) -> Self {
        let (state_tx, _) = watch::channel(PipelineState::Idle);

        Self {
            inner: Arc::new(Inner {
                uploader,
                analysis,
                limits,
                shared: Mutex::new(Shared {
                    generation: RunId::default(),
                    asset: None,
                }),
                state_tx,
            }),
        }
    }

    /// Build an orchestrator wired to the Cloudinary uploader and the HTTP analysis client.
    pub fn from_config(config: &GeolensConfig) -> anyhow::Result<Self> {
        let uploader = create_uploader(config).context("Failed to create upload backend")?;
        let analysis = AnalysisClient::new(config.analysis_settings())
            .context("Failed to create analysis client")?;

        Ok(Self::new(uploader, Arc::new(analysis), config.size_limits()))
    }

    /// Subscribe to state changes. Receivers only ever observe the latest state.
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.inner.state_tx.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> PipelineState {
        self.inner.state_tx.borrow().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.inner
            .shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: PipelineState) {
        tracing::debug!(phase = state.phase(), "Pipeline state changed");
        self.inner.state_tx.send_replace(state);
    }

    /// Select a file, replacing any previous selection.
    ///
    /// The file is classified from its declared content type only (`image/*` or
    /// `video/*`). The payload is not inspected, so a misreported type passes through
    /// unchanged; callers must treat the declared type as untrusted input.
    ///
    /// Any run still in flight is superseded, whether or not the new selection is
    /// accepted. On rejection the previous selection is cleared and the state returns
    /// to `Idle`.
    pub fn select_file(&self, file: SelectedFile) -> Result<MediaCategory, PipelineError> {
        let mut shared = self.lock();
        shared.generation = shared.generation.next();

        match classify_file(file) {
            Ok(asset) => {
                let category = asset.category();
                let filename = asset.filename().to_string();
                tracing::info!(
                    run_id = %shared.generation,
                    %category,
                    filename = %filename,
                    size = asset.size(),
                    "File selected"
                );
                shared.asset = Some(asset);
                self.publish(PipelineState::FileSelected { filename, category });
                Ok(category)
            }
            Err(err) => {
                shared.asset = None;
                tracing::warn!(error = %err, "File selection rejected");
                self.publish(PipelineState::Idle);
                Err(err)
            }
        }
    }

    /// Discard the selection and any in-flight run, returning to `Idle`.
    pub fn reset(&self) {
        let mut shared = self.lock();
        shared.generation = shared.generation.next();
        shared.asset = None;
        tracing::info!(run_id = %shared.generation, "Pipeline reset");
        self.publish(PipelineState::Idle);
    }

    /// Upload the selected file, submit it for analysis, and publish the normalized result.
    ///
    /// Rejected without changing state when a run is already in flight
    /// (`RunInProgress`) or nothing is selected (`NoFileSelected`). The selection is
    /// released once its upload succeeds; a run that fails earlier leaves it held, so
    /// calling this again retries the whole run.
    /// Returns `Superseded` if a newer selection or reset happened while this run was
    /// suspended; in that case the published state is left untouched.
    #[tracing::instrument(skip(self), fields(run_id = tracing::field::Empty))]
    pub async fn run_pipeline(&self) -> Result<AnalysisResult, PipelineError> {
        let (run_id, asset) = self.begin_run()?;
        tracing::Span::current().record("run_id", run_id.0);

        let category = asset.category();
        tracing::info!(%category, backend = self.inner.uploader.backend_name(), "Uploading media");

        let reference = match self.inner.uploader.upload(asset).await {
            Ok(reference) => reference,
            Err(e) => return Err(self.fail(run_id, PipelineError::UploadFailed(e.to_string()))),
        };

        if reference.category != category {
            return Err(self.fail(
                run_id,
                PipelineError::UploadFailed(format!(
                    "storage returned a {} reference for a {} asset",
                    reference.category, category
                )),
            ));
        }

        // A superseded run stops here rather than submitting a stale URL.
        self.finish_upload(run_id)?;
        tracing::info!(url = %reference.url, "Submitting for analysis");

        let payload = match self.inner.analysis.submit(&reference).await {
            Ok(payload) => payload,
            Err(e) => {
                return Err(self.fail(run_id, PipelineError::AnalysisFailed(e.to_string())))
            }
        };

        let result = normalize(category, &payload);
        self.transition(
            run_id,
            PipelineState::Succeeded {
                run_id,
                result: result.clone(),
            },
        )?;

        tracing::info!(location = result.location(), "Analysis completed");
        Ok(result)
    }

    /// Guard and enter `Uploading` with a copy of the held asset.
    fn begin_run(&self) -> Result<(RunId, MediaAsset), PipelineError> {
        let shared = self.lock();

        if self.inner.state_tx.borrow().is_in_flight() {
            tracing::debug!("Run rejected: another run is in flight");
            return Err(PipelineError::RunInProgress);
        }

        let Some(asset) = shared.asset.clone() else {
            tracing::debug!("Run rejected: no file selected");
            return Err(PipelineError::NoFileSelected);
        };

        let run_id = shared.generation;

        if let Err(err) = validate_payload_size(&asset, &self.inner.limits) {
            log_failure(run_id, &err);
            self.publish(PipelineState::Failed {
                error: ErrorInfo::from(&err),
            });
            return Err(err);
        }

        self.publish(PipelineState::Uploading { run_id });
        Ok((run_id, asset))
    }

    /// Publish `state` if `run_id` is still current.
    fn transition(&self, run_id: RunId, state: PipelineState) -> Result<(), PipelineError> {
        let shared = self.lock();
        ensure_current(&shared, run_id)?;
        self.publish(state);
        Ok(())
    }

    /// Release the uploaded asset and enter `Analyzing` if `run_id` is still current.
    fn finish_upload(&self, run_id: RunId) -> Result<(), PipelineError> {
        let mut shared = self.lock();
        ensure_current(&shared, run_id)?;
        shared.asset = None;
        self.publish(PipelineState::Analyzing { run_id });
        Ok(())
    }

    /// Publish `Failed` for a current run. A stale run's failure is swallowed and
    /// reported to the caller as `Superseded`.
    fn fail(&self, run_id: RunId, err: PipelineError) -> PipelineError {
        let failed = PipelineState::Failed {
            error: ErrorInfo::from(&err),
        };
        match self.transition(run_id, failed) {
            Ok(()) => {
                log_failure(run_id, &err);
                err
            }
            Err(superseded) => superseded,
        }
    }
}

fn ensure_current(shared: &Shared, run_id: RunId) -> Result<(), PipelineError> {
    if shared.generation != run_id {
        tracing::info!(current = %shared.generation, "Run superseded, discarding its outcome");
        return Err(PipelineError::Superseded { run_id });
    }
    Ok(())
}

fn log_failure(run_id: RunId, err: &PipelineError) {
    let code = err.error_code();
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(%run_id, code, error = %err, "Run failed"),
        LogLevel::Warn => tracing::warn!(%run_id, code, error = %err, "Run failed"),
        LogLevel::Error => tracing::error!(%run_id, code, error = %err, "Run failed"),
    }
}
