//! In-memory upload and analysis backends for orchestrator tests.
//!
//! A gated fake signals `started` when its call begins and then suspends until the
//! test calls `release`, which lets tests act while a run is in flight.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::Notify;

use geolens_api_client::{AnalysisBackend, AnalysisClientError};
use geolens_core::validation::SizeLimits;
use geolens_core::{MediaAsset, MediaCategory, UploadedReference};
use geolens_storage::{MediaUploader, StorageError, StorageResult};

use crate::Orchestrator;

#[derive(Default)]
pub(crate) struct Gate {
    enabled: bool,
    started: Notify,
    release: Notify,
}

impl Gate {
    async fn pass(&self) {
        if self.enabled {
            self.started.notify_one();
            self.release.notified().await;
        }
    }
}

pub(crate) struct FakeUploader {
    url: String,
    fail: bool,
    category_override: Option<MediaCategory>,
    calls: AtomicUsize,
    gate: Gate,
}

impl FakeUploader {
    pub(crate) fn ok(url: &str) -> Self {
        Self {
            url: url.to_string(),
            fail: false,
            category_override: None,
            calls: AtomicUsize::new(0),
            gate: Gate::default(),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::ok("")
        }
    }

    pub(crate) fn gated(mut self) -> Self {
        self.gate.enabled = true;
        self
    }

    pub(crate) fn with_category(mut self, category: MediaCategory) -> Self {
        self.category_override = Some(category);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) async fn wait_started(&self) {
        self.gate.started.notified().await;
    }

    pub(crate) fn release(&self) {
        self.gate.release.notify_one();
    }
}

#[async_trait]
impl MediaUploader for FakeUploader {
    async fn upload(&self, asset: MediaAsset) -> StorageResult<UploadedReference> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let category = asset.category();
        drop(asset);

        self.gate.pass().await;

        if self.fail {
            return Err(StorageError::Status {
                status: 500,
                body: "storage unavailable".to_string(),
            });
        }

        Ok(UploadedReference {
            url: self.url.clone(),
            category: self.category_override.unwrap_or(category),
        })
    }

    fn backend_name(&self) -> &'static str {
        "fake"
    }
}

pub(crate) struct FakeBackend {
    payload: JsonValue,
    fail: bool,
    submitted: Mutex<Vec<String>>,
    gate: Gate,
}

impl FakeBackend {
    pub(crate) fn ok(payload: JsonValue) -> Self {
        Self {
            payload,
            fail: false,
            submitted: Mutex::new(Vec::new()),
            gate: Gate::default(),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::ok(JsonValue::Null)
        }
    }

    pub(crate) fn gated(mut self) -> Self {
        self.gate.enabled = true;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    pub(crate) fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    pub(crate) async fn wait_started(&self) {
        self.gate.started.notified().await;
    }

    pub(crate) fn release(&self) {
        self.gate.release.notify_one();
    }
}

#[async_trait]
impl AnalysisBackend for FakeBackend {
    async fn submit(&self, reference: &UploadedReference) -> Result<JsonValue, AnalysisClientError> {
        self.submitted.lock().unwrap().push(reference.url.clone());

        self.gate.pass().await;

        if self.fail {
            return Err(AnalysisClientError::Status {
                status: 502,
                message: "backend down".to_string(),
            });
        }
        Ok(self.payload.clone())
    }
}

pub(crate) struct Harness {
    pub(crate) uploader: Arc<FakeUploader>,
    pub(crate) backend: Arc<FakeBackend>,
    limits: SizeLimits,
}

impl Harness {
    pub(crate) fn new(uploader: FakeUploader, backend: FakeBackend) -> Self {
        Self {
            uploader: Arc::new(uploader),
            backend: Arc::new(backend),
            limits: SizeLimits::default(),
        }
    }

    pub(crate) fn with_limits(mut self, limits: SizeLimits) -> Self {
        self.limits = limits;
        self
    }

    pub(crate) fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(self.uploader.clone(), self.backend.clone(), self.limits)
    }
}
