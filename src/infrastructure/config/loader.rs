use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project config file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "policywatch.yaml";

/// Optional local overrides, relative to the working directory
pub const LOCAL_CONFIG_FILE: &str = ".policywatch/local.yaml";

/// Prefix of environment overrides; `__` separates nested keys
pub const ENV_PREFIX: &str = "POLICYWATCH_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid scan interval: {0}. Must be at least 1 second")]
    InvalidInterval(u64),

    #[error("Source {0} cannot be empty")]
    EmptySourceField(&'static str),

    #[error("Policies directory cannot be empty")]
    EmptyPoliciesDir,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Invalid max_tokens: {0}. Must be at least 1")]
    InvalidMaxTokens(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid max_log_chars: {0}. Must be at least 1")]
    InvalidMaxLogChars(usize),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. policywatch.yaml (project config, optional)
    /// 3. .policywatch/local.yaml (local overrides, optional)
    /// 4. Environment variables (POLICYWATCH_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        Self::extract(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Yaml::file(DEFAULT_CONFIG_FILE))
                .merge(Yaml::file(LOCAL_CONFIG_FILE))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
        .context("Failed to extract configuration from figment")
    }

    /// Load configuration from a specific file, still honouring environment
    /// overrides. The file must exist.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.is_file() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        Self::extract(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Yaml::file(path))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
        .with_context(|| format!("Failed to load config from {}", path.display()))
    }

    fn extract(figment: Figment) -> Result<Config> {
        let config: Config = figment.extract()?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.scan.interval_secs == 0 {
            return Err(ConfigError::InvalidInterval(config.scan.interval_secs));
        }

        if config.source.id.trim().is_empty() {
            return Err(ConfigError::EmptySourceField("id"));
        }
        if config.source.path.trim().is_empty() {
            return Err(ConfigError::EmptySourceField("path"));
        }

        if config.policies.dir.trim().is_empty() {
            return Err(ConfigError::EmptyPoliciesDir);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        if config.detector.max_tokens == 0 {
            return Err(ConfigError::InvalidMaxTokens(config.detector.max_tokens));
        }

        if config.detector.initial_backoff_ms >= config.detector.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.detector.initial_backoff_ms,
                config.detector.max_backoff_ms,
            ));
        }

        if config.diagnostics.max_log_chars == 0 {
            return Err(ConfigError::InvalidMaxLogChars(
                config.diagnostics.max_log_chars,
            ));
        }

        Ok(())
    }
}
