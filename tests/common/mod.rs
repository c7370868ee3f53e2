//! Common test utilities for integration tests
//!
//! Provides a temporary document + policy directory fixture and fake
//! semantic detectors shared across integration test files.

#![allow(dead_code)]

use async_trait::async_trait;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

use policywatch::application::{MonitorState, ScanOrchestrator};
use policywatch::domain::models::{
    CandidateViolation, DiagnosticsConfig, Policy, Severity, Source, Violation, ViolationDetails,
};
use policywatch::infrastructure::filesystem::{FsDocumentSource, FsPolicySource};
use policywatch::services::{DetectionPipeline, HeuristicDetector, PolicyStore};
use policywatch::{DetectorError, SemanticDetector};

pub const SOURCE_ID: &str = "google-drive";

/// Fixed base so tests control modification times exactly.
const BASE_MTIME_SECS: u64 = 1_700_000_000;

/// Temporary monitored document and policy directory.
pub struct Fixture {
    pub dir: TempDir,
    pub doc_path: PathBuf,
    pub policies_dir: PathBuf,
}

impl Fixture {
    /// Document plus the three standard policies.
    pub fn new(document: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let policies_dir = dir.path().join("policies");
        fs::create_dir_all(&policies_dir).expect("Failed to create policies dir");
        let fixture = Self {
            doc_path: dir.path().join("user_journey.txt"),
            policies_dir,
            dir,
        };
        fixture.write_policy("gdpr", "Personal data must be protected.", 0);
        fixture.write_policy("secrets_handling", "Never store secrets in documents.", 0);
        fixture.write_policy("data_retention", "Users must be able to delete data.", 0);
        fixture.write_document(document, 0);
        fixture
    }

    pub fn source(&self) -> Source {
        Source {
            id: SOURCE_ID.to_string(),
            name: "Google Drive".to_string(),
            description: "Test document".to_string(),
            path: self.doc_path.to_string_lossy().to_string(),
        }
    }

    /// Write the document with a modification time `tick` seconds past the base.
    pub fn write_document(&self, text: &str, tick: u64) {
        fs::write(&self.doc_path, text).expect("Failed to write document");
        set_mtime(&self.doc_path, tick);
    }

    pub fn remove_document(&self) {
        fs::remove_file(&self.doc_path).expect("Failed to remove document");
    }

    pub fn write_policy(&self, stem: &str, text: &str, tick: u64) {
        let path = self.policies_dir.join(format!("{stem}.md"));
        fs::write(&path, text).expect("Failed to write policy");
        set_mtime(&path, tick);
    }

    /// Orchestrator over this fixture; heuristic-only when `semantic` is `None`.
    pub fn orchestrator(
        &self,
        semantic: Option<Arc<dyn SemanticDetector>>,
    ) -> Arc<ScanOrchestrator> {
        self.orchestrator_with(semantic, DiagnosticsConfig::default())
    }

    pub fn orchestrator_with(
        &self,
        semantic: Option<Arc<dyn SemanticDetector>>,
        diagnostics: DiagnosticsConfig,
    ) -> Arc<ScanOrchestrator> {
        let source = self.source();
        let model = semantic.as_ref().map(|d| d.model().to_string());
        let policy_store = PolicyStore::new(Arc::new(FsPolicySource::new(
            self.policies_dir.clone(),
            "md",
        )));
        let pipeline = DetectionPipeline::new(HeuristicDetector::new(source.clone()), semantic);
        let monitor = Arc::new(MonitorState::new(source, policy_store, model));
        Arc::new(ScanOrchestrator::new(
            monitor,
            Arc::new(FsDocumentSource::new(self.doc_path.clone())),
            pipeline,
            diagnostics,
        ))
    }
}

fn set_mtime(path: &Path, tick: u64) {
    let at = SystemTime::UNIX_EPOCH + Duration::from_secs(BASE_MTIME_SECS + tick);
    File::options()
        .write(true)
        .open(path)
        .and_then(|file| file.set_modified(at))
        .expect("Failed to set modification time");
}

pub fn candidate(id: &str, policy_id: &str) -> CandidateViolation {
    CandidateViolation {
        id: id.to_string(),
        title: format!("Violation {id}"),
        summary: "Detected by test detector".to_string(),
        source_id: SOURCE_ID.to_string(),
        policy_id: policy_id.to_string(),
        severity: Severity::High,
        details: ViolationDetails {
            rule: "rule".to_string(),
            evidence: "evidence".to_string(),
            location: "Google Drive (google-drive)".to_string(),
            recommendation: "fix it".to_string(),
        },
    }
}

/// What a [`FakeDetector`] does when called.
pub enum Response {
    Candidates(Vec<CandidateViolation>),
    Fail,
}

/// Scriptable semantic detector that counts calls and tracks concurrency.
pub struct FakeDetector {
    response: Mutex<Response>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    seen_open: Mutex<Vec<usize>>,
}

impl FakeDetector {
    pub fn returning(candidates: Vec<CandidateViolation>) -> Arc<Self> {
        Arc::new(Self::with(Response::Candidates(candidates), Duration::ZERO))
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self::with(Response::Fail, Duration::ZERO))
    }

    pub fn slow(candidates: Vec<CandidateViolation>, delay: Duration) -> Arc<Self> {
        Arc::new(Self::with(Response::Candidates(candidates), delay))
    }

    fn with(response: Response, delay: Duration) -> Self {
        Self {
            response: Mutex::new(response),
            delay,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            seen_open: Mutex::new(Vec::new()),
        }
    }

    pub fn set_response(&self, response: Response) {
        *self.response.lock().unwrap() = response;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Number of open violations passed on each call.
    pub fn seen_open(&self) -> Vec<usize> {
        self.seen_open.lock().unwrap().clone()
    }
}

#[async_trait]
impl SemanticDetector for FakeDetector {
    fn model(&self) -> &str {
        "fake-model"
    }

    async fn detect(
        &self,
        _document_text: &str,
        _policies: &[Policy],
        existing_open: &[Violation],
    ) -> Result<Vec<CandidateViolation>, DetectorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_open.lock().unwrap().push(existing_open.len());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let result = match &*self.response.lock().unwrap() {
            Response::Candidates(list) => Ok(list.clone()),
            Response::Fail => Err(DetectorError::Timeout),
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Upcast for passing a fake into the pipeline.
pub fn semantic(detector: &Arc<FakeDetector>) -> Option<Arc<dyn SemanticDetector>> {
    Some(Arc::clone(detector) as Arc<dyn SemanticDetector>)
}
