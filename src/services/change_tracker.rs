//! Document change tracking and the scan-due predicate.

use crate::domain::ports::ModificationSignal;

/// Remembers the last document signal a scan proceeded with.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    document_signal: Option<ModificationSignal>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing was observed yet or the signal moved.
    pub fn document_changed(&self, current: ModificationSignal) -> bool {
        self.document_signal != Some(current)
    }

    pub fn observe(&mut self, current: ModificationSignal) {
        self.document_signal = Some(current);
    }

    pub fn last_document_signal(&self) -> Option<ModificationSignal> {
        self.document_signal
    }
}

/// Whether a cycle should run detection at all.
pub const fn scan_due(force: bool, policies_changed: bool, document_changed: bool) -> bool {
    force || policies_changed || document_changed
}
