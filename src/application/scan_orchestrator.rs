use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use super::monitor_state::MonitorState;
use crate::domain::errors::ScanError;
use crate::domain::models::{DiagnosticsConfig, Policy, Violation};
use crate::domain::ports::{DocumentSource, ModificationSignal};
use crate::infrastructure::logging::{SecretScrubber, truncate_chars};
use crate::services::{
    DetectionPipeline, DetectorKind, ReconcileSummary, has_retention_phrase, reconcile, scan_due,
};

const PREVIEW_CHARS: usize = 400;

/// What a single scan cycle did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// Detection ran and the ledger was committed
    Completed {
        summary: ReconcileSummary,
        detector: DetectorKind,
    },
    /// Nothing changed since the last cycle
    Skipped,
    /// The monitored document does not exist; recorded as the last scan error
    SourceMissing,
}

/// Notifications from the scan loop
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// A cycle committed a ledger
    Scanned {
        summary: ReconcileSummary,
        detector: DetectorKind,
    },
    /// The background loop stopped
    Shutdown,
}

/// Decision taken under the state lock at the start of a cycle.
enum CyclePlan {
    Detect {
        signal: ModificationSignal,
        ledger: Vec<Violation>,
        policies: Vec<Policy>,
    },
    Skip,
    SourceMissing,
}

/// Runs scan cycles on demand or on a fixed interval.
///
/// A cycle is: reload policies if they moved, check the document, decide
/// whether a scan is due, detect outside the state lock, reconcile, and
/// commit everything in one write-locked section. Cycles never overlap:
/// a separate mutex serializes them so a manual trigger and the background
/// loop cannot commit stale snapshots over each other.
pub struct ScanOrchestrator {
    monitor: Arc<MonitorState>,
    document: Arc<dyn DocumentSource>,
    pipeline: DetectionPipeline,
    diagnostics: DiagnosticsConfig,
    scrubber: SecretScrubber,
    cycle_lock: Mutex<()>,
    running: AtomicBool,
    shutdown_tx: broadcast::Sender<()>,
    event_tx: broadcast::Sender<ScanEvent>,
}

impl ScanOrchestrator {
    pub fn new(
        monitor: Arc<MonitorState>,
        document: Arc<dyn DocumentSource>,
        pipeline: DetectionPipeline,
        diagnostics: DiagnosticsConfig,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let (event_tx, _) = broadcast::channel(64);
        Self {
            monitor,
            document,
            pipeline,
            diagnostics,
            scrubber: SecretScrubber::new(),
            cycle_lock: Mutex::new(()),
            running: AtomicBool::new(false),
            shutdown_tx,
            event_tx,
        }
    }

    pub fn monitor(&self) -> &Arc<MonitorState> {
        &self.monitor
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.event_tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Startup: force-load policies, then force a scan.
    pub async fn initialize(&self) -> Result<ScanOutcome, ScanError> {
        {
            let mut state = self.monitor.write().await;
            if let Err(err) = state.policy_store.load(true) {
                warn!(error = %err, "Initial policy load failed");
                state.last_scan_error = Some(ScanError::from(err).to_string());
            }
        }
        self.scan_once(true).await
    }

    /// Run one forced cycle, as requested by a user.
    pub async fn trigger_scan(&self) -> Result<ScanOutcome, ScanError> {
        info!("Manual scan requested");
        self.scan_once(true).await
    }

    /// Run one scan cycle.
    ///
    /// A missing document is not an error for the caller: it is recorded as
    /// the last scan error and reported as [`ScanOutcome::SourceMissing`].
    pub async fn scan_once(&self, force: bool) -> Result<ScanOutcome, ScanError> {
        let _cycle = self.cycle_lock.lock().await;

        let (signal, existing, policies) = match self.plan_cycle(force).await {
            CyclePlan::Detect {
                signal,
                ledger,
                policies,
            } => (signal, ledger, policies),
            CyclePlan::Skip => return Ok(ScanOutcome::Skipped),
            CyclePlan::SourceMissing => return Ok(ScanOutcome::SourceMissing),
        };

        let text = match self.document.read() {
            Ok(text) => text,
            Err(source) => {
                let err = ScanError::DocumentRead {
                    path: self.document.path().to_path_buf(),
                    source,
                };
                error!(error = %err, "Failed to read monitored document");
                self.monitor.write().await.last_scan_error = Some(err.to_string());
                return Err(err);
            }
        };
        self.log_document(&text);

        let open: Vec<Violation> = existing.iter().filter(|v| v.is_open()).cloned().collect();
        let detection = self.pipeline.detect(&text, &policies, &open).await;
        let now = Utc::now();
        let (ledger, summary) = reconcile(existing, detection.candidates, now);

        {
            let mut state = self.monitor.write().await;
            state.ledger = ledger;
            state.last_scan_at = Some(now);
            state.last_scan_error = None;
            state.last_detector_diagnostic = detection.diagnostic;
            state.change_tracker.observe(signal);
            state.detections_run += 1;
        }

        if summary.changed {
            info!(
                new = summary.new,
                reopened = summary.reopened,
                resolved = summary.resolved,
                open = summary.open_count,
                resolved_total = summary.resolved_count,
                detector = detection.detector.as_str(),
                "Violations updated"
            );
        } else {
            debug!(
                open = summary.open_count,
                detector = detection.detector.as_str(),
                "Scan complete; no violation changes"
            );
        }

        let _ = self.event_tx.send(ScanEvent::Scanned {
            summary,
            detector: detection.detector,
        });
        Ok(ScanOutcome::Completed {
            summary,
            detector: detection.detector,
        })
    }

    /// Policy reload and due check, under the write lock. A skipped cycle
    /// leaves the state untouched.
    async fn plan_cycle(&self, force: bool) -> CyclePlan {
        let mut state = self.monitor.write().await;

        let policies_changed = state.policy_store.load(false).unwrap_or_else(|err| {
            warn!(error = %err, "Policy reload failed; keeping current policies");
            false
        });

        let Some(signal) = self.document.signal() else {
            let err = ScanError::MissingSource {
                path: self.document.path().to_path_buf(),
            };
            warn!(error = %err, "Monitored document is missing; skipping scan");
            state.last_scan_error = Some(err.to_string());
            state.last_scan_at = Some(Utc::now());
            return CyclePlan::SourceMissing;
        };

        let document_changed = state.change_tracker.document_changed(signal);
        if !scan_due(force, policies_changed, document_changed) {
            debug!("No document or policy changes; skipping scan");
            return CyclePlan::Skip;
        }

        state.cycles_run += 1;
        CyclePlan::Detect {
            signal,
            ledger: state.ledger.clone(),
            policies: state.policy_store.policies().to_vec(),
        }
    }

    fn log_document(&self, text: &str) {
        let preview = self.scrubber.scrub(&truncate_chars(text, PREVIEW_CHARS));
        info!(
            path = %self.document.path().display(),
            chars = text.chars().count(),
            preview = %preview,
            "Scanning document"
        );
        info!(
            retention_phrase_present = has_retention_phrase(text),
            "Retention phrase check"
        );
        if self.diagnostics.log_scan_text {
            info!(
                text = %self.scrubber.scrub(&truncate_chars(text, self.diagnostics.max_log_chars)),
                "Full document text"
            );
        }
    }

    /// Spawn the background loop, scanning every `every` until [`shutdown`].
    ///
    /// Returns `None` if a loop is already running.
    ///
    /// [`shutdown`]: Self::shutdown
    pub fn start(self: &Arc<Self>, every: Duration) -> Option<JoinHandle<()>> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Scan loop already running");
            return None;
        }

        let orchestrator = Arc::clone(self);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        Some(tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_secs = every.as_secs(), "Scan loop started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(err) = orchestrator.scan_once(false).await {
                            error!(error = %err, "Scan cycle failed");
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!("Scan loop shutting down");
                        break;
                    }
                }
            }

            orchestrator.running.store(false, Ordering::SeqCst);
            let _ = orchestrator.event_tx.send(ScanEvent::Shutdown);
            info!("Scan loop stopped");
        }))
    }

    /// Signal the background loop to stop. Await the handle from
    /// [`start`](Self::start) to wait for it.
    pub fn shutdown(&self) -> bool {
        match self.shutdown_tx.send(()) {
            Ok(_) => true,
            Err(_) => {
                debug!("Shutdown requested but no scan loop is running");
                false
            }
        }
    }
}
