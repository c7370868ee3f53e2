//! Output formatting utilities for the CLI.

use serde::Serialize;

use crate::infrastructure::logging::char_prefix;

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&result.to_json()).unwrap_or_default()
        );
    } else {
        println!("{}", result.to_human());
    }
}

/// Truncate to at most `max_len` characters, appending "..." if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if char_prefix(s, max_len).is_none() {
        return s.to_string();
    }
    let head = char_prefix(s, max_len.saturating_sub(3)).unwrap_or(s);
    format!("{head}...")
}
