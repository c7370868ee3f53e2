//! In-memory policy set backed by a [`PolicySource`].

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::errors::ReloadFailure;
use crate::domain::models::Policy;
use crate::domain::ports::{ModificationSignal, PolicySource};

/// Name given to uploaded policies that arrive without one.
pub const DEFAULT_UPLOADED_POLICY_NAME: &str = "Uploaded policy";

/// Current policies plus the signal they were loaded at.
pub struct PolicyStore {
    source: Arc<dyn PolicySource>,
    policies: Vec<Policy>,
    last_signal: Option<ModificationSignal>,
    loaded: bool,
}

impl PolicyStore {
    pub fn new(source: Arc<dyn PolicySource>) -> Self {
        Self {
            source,
            policies: Vec::new(),
            last_signal: None,
            loaded: false,
        }
    }

    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }

    /// Reload from the source. Returns whether the policy set was replaced.
    ///
    /// Without `force`, contents are only re-read when the newest signal moved
    /// past the one recorded at the last load.
    pub fn load(&mut self, force: bool) -> Result<bool, ReloadFailure> {
        let latest = self.source.latest_signal()?;

        if !force && self.loaded && !is_newer(latest, self.last_signal) {
            return Ok(false);
        }

        let policies = self.source.load()?;
        info!(count = policies.len(), forced = force, "Policies loaded");
        self.policies = policies;
        self.last_signal = latest;
        self.loaded = true;
        Ok(true)
    }

    /// Add an in-memory policy in front of the loaded ones.
    ///
    /// Lives until the next reload from the source replaces the set.
    pub fn add(&mut self, name: &str, text: &str) -> Policy {
        let name = name.trim();
        let policy = Policy {
            id: format!("uploaded-{}", Uuid::new_v4().simple()),
            name: if name.is_empty() {
                DEFAULT_UPLOADED_POLICY_NAME.to_string()
            } else {
                name.to_string()
            },
            description: "Uploaded via API".to_string(),
            version: "1.0".to_string(),
            updated_at: Utc::now(),
            text: text.trim().to_string(),
        };
        debug!(policy_id = %policy.id, "Policy added");
        self.policies.insert(0, policy.clone());
        policy
    }

    /// Remove a policy by id. Returns whether anything was removed.
    pub fn remove(&mut self, policy_id: &str) -> bool {
        let before = self.policies.len();
        self.policies.retain(|p| p.id != policy_id);
        self.policies.len() != before
    }
}

/// A missing signal on either side never counts as newer, except when policies
/// appear for the first time.
fn is_newer(latest: Option<ModificationSignal>, recorded: Option<ModificationSignal>) -> bool {
    match (latest, recorded) {
        (Some(latest), Some(recorded)) => latest > recorded,
        (Some(_), None) => true,
        (None, _) => false,
    }
}
