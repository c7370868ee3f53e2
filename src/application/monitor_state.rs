//! Process-wide scan state and the read/write operations an API layer needs.
//!
//! All mutable state lives behind one `tokio::sync::RwLock`. Readers see
//! either the ledger before a scan cycle or after its commit, never a
//! partially reconciled one.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::info;

use crate::domain::errors::ReloadFailure;
use crate::domain::models::{Policy, Source, Violation, ViolationFilter};
use crate::services::{ChangeTracker, PolicyStore};

/// Mutable state shared by the scan loop and readers.
pub struct ScanState {
    pub sources: Vec<Source>,
    pub policy_store: PolicyStore,
    pub ledger: Vec<Violation>,
    pub last_scan_at: Option<DateTime<Utc>>,
    pub last_scan_error: Option<String>,
    pub last_detector_diagnostic: Option<String>,
    pub change_tracker: ChangeTracker,
    /// Cycles that passed the due check, including ones whose read failed
    pub cycles_run: u64,
    /// Cycles that ran detection and committed
    pub detections_run: u64,
}

/// Snapshot of scan health for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ScanStatus {
    pub last_scan_at: Option<DateTime<Utc>>,
    pub last_scan_error: Option<String>,
    pub last_detector_diagnostic: Option<String>,
    /// `semantic` or `heuristic`
    pub detector_mode: &'static str,
    pub model: Option<String>,
    pub api_key_configured: bool,
    pub open_count: usize,
    pub resolved_count: usize,
    pub cycles_run: u64,
    pub detections_run: u64,
}

/// Owner of the scan state.
pub struct MonitorState {
    state: RwLock<ScanState>,
    model: Option<String>,
}

impl MonitorState {
    /// `model` is the semantic detector's model, `None` in heuristic-only mode.
    pub fn new(source: Source, policy_store: PolicyStore, model: Option<String>) -> Self {
        Self {
            state: RwLock::new(ScanState {
                sources: vec![source],
                policy_store,
                ledger: Vec::new(),
                last_scan_at: None,
                last_scan_error: None,
                last_detector_diagnostic: None,
                change_tracker: ChangeTracker::new(),
                cycles_run: 0,
                detections_run: 0,
            }),
            model,
        }
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, ScanState> {
        self.state.write().await
    }

    pub async fn sources(&self) -> Vec<Source> {
        self.state.read().await.sources.clone()
    }

    pub async fn policies(&self) -> Vec<Policy> {
        self.state.read().await.policy_store.policies().to_vec()
    }

    /// Ledger entries matching `filter`, in ledger order.
    pub async fn violations(&self, filter: &ViolationFilter) -> Vec<Violation> {
        self.state
            .read()
            .await
            .ledger
            .iter()
            .filter(|v| filter.matches(v))
            .cloned()
            .collect()
    }

    pub async fn status(&self) -> ScanStatus {
        let state = self.state.read().await;
        let open_count = state.ledger.iter().filter(|v| v.is_open()).count();
        ScanStatus {
            last_scan_at: state.last_scan_at,
            last_scan_error: state.last_scan_error.clone(),
            last_detector_diagnostic: state.last_detector_diagnostic.clone(),
            detector_mode: if self.model.is_some() {
                "semantic"
            } else {
                "heuristic"
            },
            model: self.model.clone(),
            api_key_configured: self.model.is_some(),
            open_count,
            resolved_count: state.ledger.len() - open_count,
            cycles_run: state.cycles_run,
            detections_run: state.detections_run,
        }
    }

    /// Force a reload from the policy source, dropping uploaded policies.
    pub async fn reload_policies(&self) -> Result<bool, ReloadFailure> {
        self.state.write().await.policy_store.load(true)
    }

    /// Add an in-memory policy. A blank name becomes `Uploaded policy`.
    pub async fn add_policy(&self, name: &str, text: &str) -> Policy {
        let policy = self.state.write().await.policy_store.add(name, text);
        info!(policy_id = %policy.id, name = %policy.name, "Policy uploaded");
        policy
    }

    /// Remove a policy by id. Returns whether one was removed.
    pub async fn delete_policy(&self, policy_id: &str) -> bool {
        let removed = self.state.write().await.policy_store.remove(policy_id);
        info!(policy_id, removed, "Policy delete requested");
        removed
    }
}
