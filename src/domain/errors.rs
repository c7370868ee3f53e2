//! Domain error types.
//!
//! None of these ever stop the background scan loop: each one is recovered
//! locally or recorded as the last scan error.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a single scan cycle.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Missing source file: {}", path.display())]
    MissingSource { path: PathBuf },

    #[error("Failed to read source file {}: {source}", path.display())]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to reload policies: {0}")]
    Reload(#[from] ReloadFailure),
}

/// Policy files could not be listed or read.
#[derive(Error, Debug)]
pub enum ReloadFailure {
    #[error("Failed to read policy path {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of the semantic detector. The detection pipeline recovers from
/// all of them by falling back to the heuristic detector.
#[derive(Error, Debug)]
pub enum DetectorError {
    /// Request could not be built or sent
    #[error("Request failed: {0}")]
    Request(String),

    /// Authentication failed due to an invalid or missing key
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Non-success status that maps to no more specific variant
    #[error("Detector API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API server error: {0}")]
    ServerError(String),

    #[error("API server overloaded")]
    Overloaded,

    #[error("Timeout waiting for response")]
    Timeout,

    /// Response carried no text content to parse
    #[error("Detector response contained no text content")]
    EmptyResponse,

    /// Response envelope did not match the expected API shape
    #[error("Invalid detector response: {0}")]
    InvalidResponse(String),
}

impl DetectorError {
    /// Returns true if this error is transient and worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::ServerError(_) | Self::Overloaded | Self::Timeout
        )
    }

    /// Map an HTTP status code and response body to an error variant
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::AuthenticationFailed(body),
            429 => Self::RateLimited,
            500 | 502 | 503 | 504 => Self::ServerError(body),
            529 => Self::Overloaded,
            _ => Self::Api { status, body },
        }
    }
}
