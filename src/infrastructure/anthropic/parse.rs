//! Defensive parsing of the semantic detector's JSON answer.
//!
//! The model is asked for `{"violations": [...]}` but is not trusted to
//! deliver it. Anything that does not validate is dropped with a warning.

use serde_json::Value;
use tracing::warn;

use crate::domain::models::CandidateViolation;

/// Outcome of parsing one response body.
#[derive(Debug, Clone, Default)]
pub struct ParsedCandidates {
    pub candidates: Vec<CandidateViolation>,
    /// Items that were present but failed validation.
    pub dropped: usize,
    /// The body was not JSON at all.
    pub unparseable: bool,
}

/// Models sometimes wrap JSON in a fenced code block.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

pub fn parse_candidates(content: &str) -> ParsedCandidates {
    let parsed: Value = match serde_json::from_str(strip_code_fence(content)) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "Failed to parse detector JSON response, returning 0 violations");
            return ParsedCandidates {
                unparseable: true,
                ..ParsedCandidates::default()
            };
        }
    };

    let raw_items = match parsed {
        Value::Object(mut map) => map.remove("violations").unwrap_or(Value::Array(Vec::new())),
        Value::Array(items) => Value::Array(items),
        other => {
            warn!(kind = json_kind(&other), "Detector response JSON has unexpected type");
            Value::Array(Vec::new())
        }
    };

    let items = match raw_items {
        Value::Array(items) => items,
        other => {
            warn!(
                kind = json_kind(&other),
                "Detector response field 'violations' is not a list; treating as empty"
            );
            Vec::new()
        }
    };

    let mut result = ParsedCandidates::default();
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            warn!(index, kind = json_kind(&item), "Detector item is not an object; skipping");
            result.dropped += 1;
            continue;
        }
        match serde_json::from_value::<CandidateViolation>(item) {
            Ok(candidate) if candidate.id.trim().is_empty() => {
                warn!(index, "Detector item has an empty id; skipping");
                result.dropped += 1;
            }
            Ok(candidate) => result.candidates.push(candidate),
            Err(err) => {
                warn!(index, error = %err, "Detector item failed validation; skipping");
                result.dropped += 1;
            }
        }
    }
    result
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
