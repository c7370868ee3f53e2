//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty stderr output
//! - Optional rolling file output
//! - Secret scrubbing for diagnostic payloads

pub mod logger;
pub mod secret_scrubbing;

pub use logger::LoggerImpl;
pub use secret_scrubbing::SecretScrubber;

/// The first `limit` characters of `text`, or `None` if it is not longer.
pub fn char_prefix(text: &str, limit: usize) -> Option<&str> {
    text.char_indices().nth(limit).map(|(end, _)| &text[..end])
}

/// Cut `text` to at most `limit` characters, noting the original length.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match char_prefix(text, limit) {
        Some(head) => format!(
            "{head}\n\n...[truncated, total_chars={}]",
            text.chars().count()
        ),
        None => text.to_string(),
    }
}
