//! [`SemanticDetector`] backed by the Anthropic Messages API.

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use super::client::{AnthropicClient, AnthropicClientConfig};
use super::parse::parse_candidates;
use super::prompt::{
    AUDIT_SYSTEM_PROMPT, SYSTEM_PROMPT, audit_prompt, existing_blob, policy_blob, user_prompt,
};
use super::types::MessagesRequest;
use crate::domain::errors::DetectorError;
use crate::domain::models::{CandidateViolation, Config, DiagnosticsConfig, Policy, Violation};
use crate::domain::ports::SemanticDetector;
use crate::infrastructure::logging::{SecretScrubber, truncate_chars};
use crate::services::HeuristicSignals;

pub struct AnthropicDetector {
    client: AnthropicClient,
    model: String,
    max_tokens: u32,
    source_id: String,
    diagnostics: DiagnosticsConfig,
    scrubber: SecretScrubber,
}

impl AnthropicDetector {
    pub fn new(
        client: AnthropicClient,
        model: impl Into<String>,
        max_tokens: u32,
        source_id: impl Into<String>,
        diagnostics: DiagnosticsConfig,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens,
            source_id: source_id.into(),
            diagnostics,
            scrubber: SecretScrubber::new(),
        }
    }

    /// Build a detector from configuration.
    ///
    /// Returns `Ok(None)` when no API key is configured, which puts the
    /// pipeline in heuristic-only mode.
    pub fn from_config(config: &Config) -> Result<Option<Self>, DetectorError> {
        let Some(api_key) = config.detector.resolve_api_key() else {
            return Ok(None);
        };
        let client = AnthropicClient::new(AnthropicClientConfig::from_detector_config(
            &config.detector,
            api_key,
        ))?;
        Ok(Some(Self::new(
            client,
            config.detector.model.clone(),
            config.detector.max_tokens,
            config.source.id.clone(),
            config.diagnostics.clone(),
        )))
    }

    /// Truncate and scrub text before it reaches a log sink.
    fn loggable(&self, text: &str) -> String {
        self.scrubber
            .scrub(&truncate_chars(text, self.diagnostics.max_log_chars))
    }

    /// Sentence-by-sentence verdicts, logged for diagnosis only.
    async fn run_audit(&self, document_text: &str, policies: &[Policy], blob: &str) {
        let request = MessagesRequest::single_turn(
            &self.model,
            self.max_tokens,
            AUDIT_SYSTEM_PROMPT,
            audit_prompt(
                document_text,
                policies,
                blob,
                self.diagnostics.audit_max_sentences,
            ),
        );
        match self.client.send_message(&request).await {
            Ok(response) => {
                let text = response.first_text().unwrap_or_default();
                info!(audit = %self.loggable(text), "Detector audit");
            }
            Err(err) => warn!(error = %err, "Detector audit failed"),
        }
    }
}

#[async_trait]
impl SemanticDetector for AnthropicDetector {
    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(
        name = "semantic_detect",
        skip_all,
        fields(model = %self.model, policies = policies.len(), existing_open = existing_open.len())
    )]
    async fn detect(
        &self,
        document_text: &str,
        policies: &[Policy],
        existing_open: &[Violation],
    ) -> Result<Vec<CandidateViolation>, DetectorError> {
        let signals = HeuristicSignals::scan(document_text);
        let blob = policy_blob(policies);
        let prompt = user_prompt(
            document_text,
            &self.source_id,
            &blob,
            &existing_blob(existing_open),
            &signals,
        );

        if self.diagnostics.log_payload {
            info!(
                system = SYSTEM_PROMPT,
                user = %self.loggable(&prompt),
                "Detector request payload"
            );
        }

        let request =
            MessagesRequest::single_turn(&self.model, self.max_tokens, SYSTEM_PROMPT, prompt);
        let response = self.client.send_message(&request).await?;
        let content = response.first_text().ok_or(DetectorError::EmptyResponse)?;

        if self.diagnostics.log_response {
            info!(raw = %self.loggable(content), "Detector raw response");
        }

        let parsed = parse_candidates(content);
        if parsed.unparseable {
            warn!(
                retention_phrase_present = signals.retention.is_some(),
                raw = %self.loggable(content),
                "Detector response was not JSON"
            );
        } else if parsed.candidates.is_empty() {
            let policy_ids: Vec<&str> = policies.iter().map(|p| p.id.as_str()).collect();
            warn!(
                retention_phrase_present = signals.retention.is_some(),
                policy_ids = ?policy_ids,
                dropped = parsed.dropped,
                "Detector produced 0 violations"
            );
            if self.diagnostics.log_empty_response {
                warn!(raw = %self.loggable(content), "Detector raw JSON for empty result");
            }
        } else if parsed.dropped > 0 {
            warn!(
                kept = parsed.candidates.len(),
                dropped = parsed.dropped,
                "Detector returned malformed items"
            );
        }

        if self.diagnostics.audit {
            self.run_audit(document_text, policies, &blob).await;
        }

        Ok(parsed.candidates)
    }
}
