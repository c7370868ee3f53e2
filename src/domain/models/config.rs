use serde::{Deserialize, Serialize};

use super::policy::Source;

/// Main configuration structure for policywatch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// The monitored document
    #[serde(default)]
    pub source: SourceConfig,

    /// Where policy documents live
    #[serde(default)]
    pub policies: PoliciesConfig,

    /// Scan scheduling
    #[serde(default)]
    pub scan: ScanConfig,

    /// Semantic detector (Anthropic Messages API)
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Diagnostic verbosity toggles
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// Monitored document configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SourceConfig {
    #[serde(default = "default_source_id")]
    pub id: String,

    #[serde(default = "default_source_name")]
    pub name: String,

    #[serde(default = "default_source_description")]
    pub description: String,

    /// Path to the plain-text document
    #[serde(default = "default_source_path")]
    pub path: String,
}

fn default_source_id() -> String {
    "google-drive".to_string()
}

fn default_source_name() -> String {
    "Google Drive".to_string()
}

fn default_source_description() -> String {
    "Local text document standing in for a Drive file".to_string()
}

fn default_source_path() -> String {
    "data/sources/google_drive/user_journey.txt".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            id: default_source_id(),
            name: default_source_name(),
            description: default_source_description(),
            path: default_source_path(),
        }
    }
}

impl SourceConfig {
    pub fn to_source(&self) -> Source {
        Source {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            path: self.path.clone(),
        }
    }
}

/// Policy directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PoliciesConfig {
    /// Directory holding one policy per file
    #[serde(default = "default_policies_dir")]
    pub dir: String,

    /// File extension of policy files, without the dot
    #[serde(default = "default_policies_extension")]
    pub extension: String,
}

fn default_policies_dir() -> String {
    "data/policies".to_string()
}

fn default_policies_extension() -> String {
    "md".to_string()
}

impl Default for PoliciesConfig {
    fn default() -> Self {
        Self {
            dir: default_policies_dir(),
            extension: default_policies_extension(),
        }
    }
}

/// Scan scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScanConfig {
    /// Seconds between background scan cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Run a forced scan before the background loop starts
    #[serde(default = "default_true")]
    pub scan_on_startup: bool,
}

const fn default_interval_secs() -> u64 {
    10
}

const fn default_true() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            scan_on_startup: true,
        }
    }
}

/// Semantic detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DetectorConfig {
    /// API key; falls back to `ANTHROPIC_API_KEY`. Absent means heuristic-only.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Maximum tokens to generate per request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum retry attempts for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

const fn default_max_tokens() -> u32 {
    4096
}

const fn default_timeout_secs() -> u64 {
    120
}

const fn default_max_retries() -> u32 {
    2
}

const fn default_initial_backoff_ms() -> u64 {
    1000
}

const fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            api_version: default_api_version(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl DetectorConfig {
    /// API key from config or environment. Blank keys count as absent.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Diagnostic verbosity toggles for the scan cycle and semantic detector
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(clippy::struct_excessive_bools)]
pub struct DiagnosticsConfig {
    /// Log the full (truncated) document text on every scan
    #[serde(default)]
    pub log_scan_text: bool,

    /// Log the prompt sent to the semantic detector
    #[serde(default)]
    pub log_payload: bool,

    /// Log the raw semantic detector response
    #[serde(default)]
    pub log_response: bool,

    /// Log the raw response when it yields no violations
    #[serde(default = "default_true")]
    pub log_empty_response: bool,

    /// Issue an extra sentence-by-sentence audit request
    #[serde(default)]
    pub audit: bool,

    /// Cap on sentences sent to the audit request
    #[serde(default = "default_audit_max_sentences")]
    pub audit_max_sentences: usize,

    /// Truncation limit for logged payloads
    #[serde(default = "default_max_log_chars")]
    pub max_log_chars: usize,
}

const fn default_audit_max_sentences() -> usize {
    40
}

const fn default_max_log_chars() -> usize {
    8000
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            log_scan_text: false,
            log_payload: false,
            log_response: false,
            log_empty_response: true,
            audit: false,
            audit_max_sentences: default_audit_max_sentences(),
            max_log_chars: default_max_log_chars(),
        }
    }
}
