use regex::{Captures, Regex};
use std::fmt;
use std::sync::LazyLock;

static LIVE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sk_live_[A-Za-z0-9_\-]+").expect("live key pattern is valid"));

static ANTHROPIC_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"sk-ant-[a-zA-Z0-9\-_]{8,}").expect("api key pattern is valid")
});

static BEARER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9\-_\.]+").expect("bearer pattern is valid"));

static KEY_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(["']?(?:api_key|apikey|token|secret|password)["']?\s*[:=]\s*)["']?[^"'\s,}]+["']?"#,
    )
    .expect("key/value pattern is valid")
});

/// Redacts credentials from text that is about to be logged.
///
/// Diagnostic payloads echo document text, which is exactly where leaked
/// tokens tend to live.
#[derive(Clone, Copy, Default)]
pub struct SecretScrubber;

impl SecretScrubber {
    pub const fn new() -> Self {
        Self
    }

    pub fn scrub(&self, message: &str) -> String {
        let scrubbed = ANTHROPIC_KEY.replace_all(message, "[API_KEY_REDACTED]");
        let scrubbed = LIVE_KEY.replace_all(&scrubbed, "sk_live_[REDACTED]");
        let scrubbed = BEARER.replace_all(&scrubbed, "Bearer [TOKEN_REDACTED]");
        KEY_VALUE
            .replace_all(&scrubbed, |caps: &Captures| format!("{}[REDACTED]", &caps[1]))
            .into_owned()
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber").finish()
    }
}
