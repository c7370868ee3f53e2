//! Deterministic pattern-based violation detector.
//!
//! Every rule is independent and emits at most one candidate with an id fixed
//! per rule, so repeated detections of the same rule collapse to the same
//! ledger entry no matter how many times or where the pattern matches.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::info;

use crate::domain::models::{CandidateViolation, Policy, Severity, Source, ViolationDetails};

/// Policy used when a rule's preferred policy is not loaded.
pub const FALLBACK_POLICY_ID: &str = "gdpr";

pub const PERSONAL_DATA_RULE_ID: &str = "b-001";
pub const PUBLIC_SHARING_RULE_ID: &str = "b-002";
pub const SECRET_TOKEN_RULE_ID: &str = "b-003";
pub const RETENTION_RULE_ID: &str = "b-004";

const ANYONE_WITH_LINK: &str = "anyone with the link";

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}").expect("email pattern is valid")
});

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d[\d \-()]{7,}\d").expect("phone pattern is valid"));

static SECRET_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sk_live_[A-Za-z0-9_\-]{10,}").expect("token pattern is valid"));

static RETENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(retain(ing)?\s+forever|retain(ing)?\s+indefinitely|keep\s+forever|stay\s+forever|cannot\s+delete|can\s*not\s+.*delete|no\s+chance\s+to\s+delete)",
    )
    .expect("retention pattern is valid")
});

/// Whether the text says data is kept forever or cannot be deleted.
pub fn has_retention_phrase(text: &str) -> bool {
    RETENTION.is_match(text)
}

/// Raw matches of every heuristic rule against one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeuristicSignals {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub anyone_with_link: bool,
    pub token: Option<String>,
    pub retention: Option<String>,
}

impl HeuristicSignals {
    pub fn scan(text: &str) -> Self {
        Self {
            email: EMAIL.find(text).map(|m| m.as_str().to_string()),
            phone: PHONE.find(text).map(|m| m.as_str().to_string()),
            anyone_with_link: text.to_lowercase().contains(ANYONE_WITH_LINK),
            token: SECRET_TOKEN.find(text).map(|m| m.as_str().to_string()),
            retention: RETENTION.find(text).map(|m| m.as_str().to_string()),
        }
    }
}

/// Pattern-rule detector for one monitored source.
#[derive(Debug, Clone)]
pub struct HeuristicDetector {
    source: Source,
}

impl HeuristicDetector {
    pub fn new(source: Source) -> Self {
        Self { source }
    }

    pub fn detect(&self, document_text: &str, policies: &[Policy]) -> Vec<CandidateViolation> {
        let signals = HeuristicSignals::scan(document_text);
        info!(
            email = signals.email.is_some(),
            phone = signals.phone.is_some(),
            anyone_link = signals.anyone_with_link,
            token = signals.token.is_some(),
            retention = signals.retention.is_some(),
            "Heuristic signals"
        );

        let policy_ids: HashSet<&str> = policies.iter().map(|p| p.id.as_str()).collect();
        let pick = |preferred: &str| {
            if policy_ids.contains(preferred) {
                preferred.to_string()
            } else {
                FALLBACK_POLICY_ID.to_string()
            }
        };

        let mut out = Vec::new();

        if signals.email.is_some() || signals.phone.is_some() {
            out.push(self.candidate(
                PERSONAL_DATA_RULE_ID,
                "Possible personal data in document",
                "Detected patterns that look like email/phone.",
                pick("gdpr"),
                Severity::Medium,
                ViolationDetails {
                    rule: "Avoid including personal data in broadly accessible documents."
                        .to_string(),
                    evidence: format!(
                        "Email: {}; Phone: {}",
                        signals.email.as_deref().unwrap_or("n/a"),
                        signals.phone.as_deref().unwrap_or("n/a"),
                    ),
                    location: self.location(),
                    recommendation: "Redact personal data and restrict access.".to_string(),
                },
            ));
        }

        if signals.anyone_with_link {
            out.push(self.candidate(
                PUBLIC_SHARING_RULE_ID,
                "Document appears to be shared publicly",
                "Found text indicating \u{201c}Anyone with the link\u{201d}.",
                pick("access-control"),
                Severity::High,
                ViolationDetails {
                    rule: "Access control: do not share personal data publicly.".to_string(),
                    evidence: "Matched phrase: \u{201c}Anyone with the link\u{201d}.".to_string(),
                    location: self.location(),
                    recommendation: "Restrict sharing and move content to a private folder."
                        .to_string(),
                },
            ));
        }

        if let Some(token) = &signals.token {
            let prefix: String = token.chars().take(12).collect();
            out.push(self.candidate(
                SECRET_TOKEN_RULE_ID,
                "Secret/token-like string found",
                "Detected a token-like pattern in the document.",
                pick("secrets-handling"),
                Severity::High,
                ViolationDetails {
                    rule: "Secrets handling: never store tokens in shared docs.".to_string(),
                    evidence: format!("Matched pattern: {prefix}\u{2026}"),
                    location: self.location(),
                    recommendation: "Rotate token and remove from document.".to_string(),
                },
            ));
        }

        if let Some(phrase) = &signals.retention {
            out.push(self.candidate(
                RETENTION_RULE_ID,
                "Indefinite retention / no deletion mentioned",
                "Document suggests users cannot delete their data or data is retained forever.",
                pick("data-retention"),
                Severity::High,
                ViolationDetails {
                    rule: "Data retention: users must be able to request deletion; indefinite \
                           retention is not allowed by default."
                        .to_string(),
                    evidence: format!("Matched phrase: \u{201c}{phrase}\u{201d}"),
                    location: self.location(),
                    recommendation: "Add a deletion process and set retention periods; remove \
                                     'forever' retention statements."
                        .to_string(),
                },
            ));
        }

        out
    }

    fn location(&self) -> String {
        format!("{} ({})", self.source.name, self.source.id)
    }

    fn candidate(
        &self,
        id: &str,
        title: &str,
        summary: &str,
        policy_id: String,
        severity: Severity,
        details: ViolationDetails,
    ) -> CandidateViolation {
        CandidateViolation {
            id: id.to_string(),
            title: title.to_string(),
            summary: summary.to_string(),
            source_id: self.source.id.clone(),
            policy_id,
            severity,
            details,
        }
    }
}
