//! HTTP client for the Anthropic Messages API

use reqwest::Client as ReqwestClient;
use std::time::Duration;
use tracing::debug;

use super::retry::RetryPolicy;
use super::types::{MessagesRequest, MessagesResponse};
use crate::domain::errors::DetectorError;
use crate::domain::models::DetectorConfig;

/// Configuration for [`AnthropicClient`]
#[derive(Debug, Clone)]
pub struct AnthropicClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub api_version: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl AnthropicClientConfig {
    pub fn from_detector_config(config: &DetectorConfig, api_key: String) -> Self {
        Self {
            api_key,
            base_url: config.base_url.clone(),
            api_version: config.api_version.clone(),
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
            initial_backoff_ms: config.initial_backoff_ms,
            max_backoff_ms: config.max_backoff_ms,
        }
    }
}

/// Messages API client with connection pooling and retry of transient errors.
pub struct AnthropicClient {
    http_client: ReqwestClient,
    api_key: String,
    base_url: String,
    api_version: String,
    retry_policy: RetryPolicy,
}

impl AnthropicClient {
    pub fn new(config: AnthropicClientConfig) -> Result<Self, DetectorError> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| DetectorError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            api_key: config.api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version,
            retry_policy: RetryPolicy::new(
                config.max_retries,
                config.initial_backoff_ms,
                config.max_backoff_ms,
            ),
        })
    }

    pub async fn send_message(
        &self,
        request: &MessagesRequest,
    ) -> Result<MessagesResponse, DetectorError> {
        self.retry_policy.execute(|| self.send_once(request)).await
    }

    async fn send_once(&self, request: &MessagesRequest) -> Result<MessagesResponse, DetectorError> {
        let response = self
            .http_client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(DetectorError::from_status(status.as_u16(), body));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| DetectorError::InvalidResponse(e.to_string()))?;

        debug!(
            message_id = %parsed.id,
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            stop_reason = parsed.stop_reason.as_deref().unwrap_or("unknown"),
            "Messages API call complete"
        );
        Ok(parsed)
    }
}

fn map_transport_error(err: reqwest::Error) -> DetectorError {
    if err.is_timeout() {
        DetectorError::Timeout
    } else {
        DetectorError::Request(err.to_string())
    }
}
