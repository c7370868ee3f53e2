//! Violation reconciliation.
//!
//! Merges a fresh detection snapshot into the ledger with an identity-keyed
//! three-way diff:
//!
//! - detected and already tracked: refreshed, reopened if it was resolved
//! - tracked but no longer detected: resolved (once)
//! - detected for the first time: created at the front of the ledger
//!
//! Nothing is ever removed, so the ledger doubles as history. Re-running with
//! an unchanged detection set reports `changed == false`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::domain::models::{CandidateViolation, Violation, ViolationStatus};

/// What a reconciliation pass did to the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    /// Any status transition, creation, or descriptive field update happened
    pub changed: bool,
    pub new: usize,
    pub reopened: usize,
    pub resolved: usize,
    /// Open entries in the resulting ledger
    pub open_count: usize,
    /// Resolved entries in the resulting ledger
    pub resolved_count: usize,
}

/// Merge `detected` (everything currently judged open) into `existing`.
///
/// `existing` is consumed and returned updated in place; its relative order
/// is preserved.
pub fn reconcile(
    existing: Vec<Violation>,
    detected: Vec<CandidateViolation>,
    now: DateTime<Utc>,
) -> (Vec<Violation>, ReconcileSummary) {
    // First occurrence fixes the order of new entries, the last one wins on content.
    let mut order: Vec<String> = Vec::with_capacity(detected.len());
    let mut detected_by_id: HashMap<String, CandidateViolation> =
        HashMap::with_capacity(detected.len());
    for candidate in detected {
        if !detected_by_id.contains_key(&candidate.id) {
            order.push(candidate.id.clone());
        }
        detected_by_id.insert(candidate.id.clone(), candidate);
    }

    let mut summary = ReconcileSummary::default();
    let mut updated = Vec::with_capacity(existing.len() + order.len());

    for mut entry in existing {
        match detected_by_id.remove(&entry.id) {
            Some(candidate) => {
                if entry.first_seen_at.is_none() {
                    entry.first_seen_at = Some(entry.created_at);
                }
                entry.last_seen_at = now;

                if entry.status == ViolationStatus::Resolved {
                    entry.status = ViolationStatus::Open;
                    entry.resolved_at = None;
                    summary.reopened += 1;
                    summary.changed = true;
                }

                if apply_descriptive_fields(&mut entry, candidate) {
                    summary.changed = true;
                }
            }
            None if entry.status != ViolationStatus::Resolved => {
                entry.status = ViolationStatus::Resolved;
                entry.resolved_at = Some(now);
                summary.resolved += 1;
                summary.changed = true;
            }
            None => {}
        }
        updated.push(entry);
    }

    // Whatever is still indexed was never in the ledger.
    let mut created: Vec<Violation> = order
        .into_iter()
        .filter_map(|id| detected_by_id.remove(&id))
        .map(|candidate| Violation::open(candidate, now))
        .collect();
    summary.new = created.len();
    if summary.new > 0 {
        summary.changed = true;
    }
    // Same effect as inserting each new entry at index 0 in detection order.
    created.reverse();
    created.append(&mut updated);
    let updated = created;

    summary.open_count = updated.iter().filter(|v| v.is_open()).count();
    summary.resolved_count = updated.len() - summary.open_count;

    (updated, summary)
}

/// Overwrite descriptive fields that differ. Returns whether any did.
fn apply_descriptive_fields(entry: &mut Violation, candidate: CandidateViolation) -> bool {
    let mut changed = false;

    macro_rules! overwrite {
        ($field:ident) => {
            if entry.$field != candidate.$field {
                entry.$field = candidate.$field;
                changed = true;
            }
        };
    }

    overwrite!(title);
    overwrite!(summary);
    overwrite!(source_id);
    overwrite!(policy_id);
    overwrite!(severity);
    overwrite!(details);

    changed
}
