//! Prompt construction for the semantic detector and its audit call.

use regex::Regex;
use std::fmt::Write as _;
use std::sync::LazyLock;

use crate::domain::models::{CandidateViolation, Policy, Violation};
use crate::services::HeuristicSignals;

pub const SYSTEM_PROMPT: &str = "You are a compliance monitoring agent. \
Given a document and a set of policies, extract potential compliance violations. \
Be practical: err slightly toward catching real risks, but never invent evidence. \
Return ONLY valid JSON matching the required schema, with no surrounding prose.";

pub const AUDIT_SYSTEM_PROMPT: &str = "You are a compliance auditor. \
For each sentence from the document, say whether it violates any policy. \
If it violates, name the best matching policy id and explain briefly. \
If it does NOT violate, explain briefly why it is OK. \
Be concise and do not skip any sentences.";

const OUTPUT_SCHEMA: &str = r#"{"violations": [{"id": string, "title": string, "summary": string, "sourceId": string, "policyId": string, "severity": "low" | "medium" | "high", "details": {"rule": string, "evidence": string, "location": string, "recommendation": string}}]}"#;

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("sentence pattern is valid"));

/// One `POLICY <id>` block per policy, headed with its name.
pub fn policy_blob(policies: &[Policy]) -> String {
    policies
        .iter()
        .map(|p| format!("POLICY {} \u{2014} {}\n{}", p.id, p.name, p.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Open violations in detector shape, as a JSON array.
pub fn existing_blob(existing_open: &[Violation]) -> String {
    let candidates: Vec<CandidateViolation> =
        existing_open.iter().map(Violation::to_candidate).collect();
    serde_json::to_string(&candidates).unwrap_or_else(|_| "[]".to_string())
}

pub fn user_prompt(
    document_text: &str,
    source_id: &str,
    policy_blob: &str,
    existing_blob: &str,
    signals: &HeuristicSignals,
) -> String {
    let mut prompt = String::new();
    let _ = write!(
        prompt,
        "DOCUMENT (sourceId={source_id}):\n{document_text}\n\n\
         POLICIES:\n{policy_blob}\n\n\
         EXISTING_OPEN_VIOLATIONS_JSON:\n{existing_blob}\n\n"
    );
    let _ = write!(
        prompt,
        "TASK:\n\
         - Identify OPEN violations present in the DOCUMENT content.\n\
         - For each violation, choose the single best matching policyId from the provided policies.\n\
         - Set sourceId to '{source_id}'.\n\n\
         STABILITY:\n\
         - If an existing open violation is still valid, include it again with the SAME id (do not change it).\n\
         - Only output currently-open violations (do not output resolved ones).\n\n"
    );
    prompt.push_str(
        "IMPORTANT DETECTION RULES (do not ignore):\n\
         - If the DOCUMENT says users cannot delete their data or data is kept forever/indefinitely, you MUST output a HIGH severity violation.\n\
         - If the DOCUMENT contains an API token/secret (e.g. sk_live_), you MUST output a HIGH severity violation.\n\
         - If the DOCUMENT is shared as 'Anyone with the link' and contains personal data (e.g. email), you MUST output a HIGH severity violation.\n\n",
    );
    let _ = write!(
        prompt,
        "FORCED TRIGGERS (based on server-side detection):\n\
         - retention_phrase_present={}\n\
         - anyone_with_link_present={}\n\
         - token_present={}\n\
         - email_present={}\n\n",
        signals.retention.is_some(),
        signals.anyone_with_link,
        signals.token.is_some(),
        signals.email.is_some(),
    );
    if signals.retention.is_some() {
        prompt.push_str(
            "retention_phrase_present=true: include a violation with id 'retention-forever' \
             unless an existing open violation already covers it.\n\n",
        );
    }
    let _ = write!(prompt, "OUTPUT FORMAT (JSON only):\n{OUTPUT_SCHEMA}\n");
    prompt
}

/// Split text after `.`, `!` or `?` followed by whitespace; blanks are dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        // Keep the punctuation, drop the whitespace.
        let end = m.start() + 1;
        sentences.push(text[start..end].trim());
        start = m.end();
    }
    sentences.push(text[start..].trim());
    sentences.retain(|s| !s.is_empty());
    sentences
}

pub fn audit_prompt(
    document_text: &str,
    policies: &[Policy],
    policy_blob: &str,
    max_sentences: usize,
) -> String {
    let ids: Vec<&str> = policies.iter().map(|p| p.id.as_str()).collect();
    let numbered = split_sentences(document_text)
        .into_iter()
        .take(max_sentences)
        .enumerate()
        .map(|(i, s)| format!("{}. {s}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "POLICY IDS AVAILABLE: {ids:?}\n\n\
         POLICIES:\n{policy_blob}\n\n\
         DOCUMENT SENTENCES:\n{numbered}\n\n\
         Output format:\n\
         SENTENCE <n>: OK|VIOLATION (policyId=<id or n/a>) \u{2014} <one sentence reason>\n"
    )
}
