//! Violation domain model.
//!
//! A violation is a detected breach of a policy in a monitored source. Its
//! identity is stable across scans; its status only ever changes through
//! reconciliation (see [`crate::services::reconciler`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a violation in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ViolationStatus {
    /// Detected in the most recent scan.
    Open,
    /// Previously detected, absent from a later scan.
    Resolved,
}

impl ViolationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Resolved => "RESOLVED",
        }
    }
}

impl fmt::Display for ViolationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-text explanation attached to a violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationDetails {
    /// The policy rule that was breached.
    pub rule: String,
    /// What in the document triggered the finding.
    pub evidence: String,
    /// Where in the source the finding was made.
    pub location: String,
    /// Suggested remediation.
    pub recommendation: String,
}

/// A violation as reported by a detector, before it enters the ledger.
///
/// Detectors only report what they currently consider open; timestamps and
/// status are owned by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateViolation {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub source_id: String,
    pub policy_id: String,
    pub severity: Severity,
    pub details: ViolationDetails,
}

/// A tracked violation in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub source_id: String,
    pub policy_id: String,
    pub severity: Severity,
    pub details: ViolationDetails,
    pub status: ViolationStatus,
    pub created_at: DateTime<Utc>,
    /// Only absent for entries imported from an older ledger; backfilled
    /// from `created_at` the next time the violation is seen.
    #[serde(default)]
    pub first_seen_at: Option<DateTime<Utc>>,
    pub last_seen_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    /// UI-only flag. Reconciliation never touches it.
    #[serde(default)]
    pub read: bool,
}

impl Violation {
    /// Open a fresh ledger entry from a candidate first seen at `now`.
    pub fn open(candidate: CandidateViolation, now: DateTime<Utc>) -> Self {
        Self {
            id: candidate.id,
            title: candidate.title,
            summary: candidate.summary,
            source_id: candidate.source_id,
            policy_id: candidate.policy_id,
            severity: candidate.severity,
            details: candidate.details,
            status: ViolationStatus::Open,
            created_at: now,
            first_seen_at: Some(now),
            last_seen_at: now,
            resolved_at: None,
            read: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == ViolationStatus::Open
    }

    /// The descriptive part of this violation, in the shape detectors use.
    pub fn to_candidate(&self) -> CandidateViolation {
        CandidateViolation {
            id: self.id.clone(),
            title: self.title.clone(),
            summary: self.summary.clone(),
            source_id: self.source_id.clone(),
            policy_id: self.policy_id.clone(),
            severity: self.severity,
            details: self.details.clone(),
        }
    }
}

/// Optional filters for listing violations.
#[derive(Debug, Clone, Default)]
pub struct ViolationFilter {
    pub source_id: Option<String>,
    pub policy_id: Option<String>,
}

impl ViolationFilter {
    pub fn matches(&self, violation: &Violation) -> bool {
        self.source_id
            .as_deref()
            .is_none_or(|id| violation.source_id == id)
            && self
                .policy_id
                .as_deref()
                .is_none_or(|id| violation.policy_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str) -> CandidateViolation {
        CandidateViolation {
            id: id.to_string(),
            title: "Secret/token-like string found".to_string(),
            summary: "Detected a token-like pattern in the document.".to_string(),
            source_id: "google-drive".to_string(),
            policy_id: "secrets-handling".to_string(),
            severity: Severity::High,
            details: ViolationDetails {
                rule: "Never store tokens in shared docs.".to_string(),
                evidence: "sk_live_abcd…".to_string(),
                location: "Google Drive (google-drive)".to_string(),
                recommendation: "Rotate the token.".to_string(),
            },
        }
    }

    #[test]
    fn test_open_sets_lifecycle_fields() {
        let now = Utc::now();
        let v = Violation::open(candidate("b-003"), now);

        assert_eq!(v.status, ViolationStatus::Open);
        assert_eq!(v.first_seen_at, Some(now));
        assert_eq!(v.last_seen_at, now);
        assert_eq!(v.created_at, now);
        assert!(v.resolved_at.is_none());
        assert!(!v.read);
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let v = Violation::open(candidate("b-003"), Utc::now());
        let json = serde_json::to_value(&v).unwrap();

        assert_eq!(json["sourceId"], "google-drive");
        assert_eq!(json["policyId"], "secrets-handling");
        assert_eq!(json["severity"], "high");
        assert_eq!(json["status"], "OPEN");
        assert!(json["resolvedAt"].is_null());
        assert!(json.get("firstSeenAt").is_some());
    }

    #[test]
    fn test_candidate_rejects_unknown_severity() {
        let json = serde_json::json!({
            "id": "x",
            "title": "t",
            "summary": "s",
            "sourceId": "google-drive",
            "policyId": "gdpr",
            "severity": "critical",
            "details": {"rule": "r", "evidence": "e", "location": "l", "recommendation": "r"}
        });
        assert!(serde_json::from_value::<CandidateViolation>(json).is_err());
    }

    #[test]
    fn test_filter_matches() {
        let v = Violation::open(candidate("b-003"), Utc::now());

        assert!(ViolationFilter::default().matches(&v));
        assert!(ViolationFilter {
            source_id: Some("google-drive".to_string()),
            policy_id: None,
        }
        .matches(&v));
        assert!(!ViolationFilter {
            source_id: None,
            policy_id: Some("gdpr".to_string()),
        }
        .matches(&v));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ViolationStatus::Resolved.to_string(), "RESOLVED");
        assert_eq!(Severity::Medium.to_string(), "medium");
    }
}
