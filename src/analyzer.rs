//! Orchestrates one analysis: build the payload, send it with rate-limit
//! backoff, and parse the verdict.

use crate::ai::format::{self, ResponseFormatStrategy};
use crate::ai::openai::types::ChatCompletionRequest;
use crate::ai::openai::{build_chat_request, OpenAiHttpClient};
use crate::ai::{parser, ChatTransport};
use crate::models::{AnalysisRequest, AnalysisResult, ProviderConfig, RetryPolicy};
use crate::{Error, Result};
use serde_json::Value;
use tokio_retry::RetryIf;
use tracing::{debug, error, info, warn};

/// Stateless between calls; every analysis owns its own attempt counter.
pub struct Analyzer {
    transport: Box<dyn ChatTransport>,
    format: Box<dyn ResponseFormatStrategy>,
    model: String,
    retry: RetryPolicy,
}

impl Analyzer {
    /// Build an analyzer around any transport.
    ///
    /// Tests use this to inject a [`crate::ai::MockChatTransport`].
    pub fn with_transport(
        transport: Box<dyn ChatTransport>,
        model: impl Into<String>,
        use_json_schema: bool,
    ) -> Self {
        Self {
            transport,
            format: format::strategy_for(use_json_schema),
            model: model.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let http = OpenAiHttpClient::new(config.api_key.clone(), &config.base_url)?;
        info!(
            endpoint = %http.endpoint(),
            model = %config.model,
            json_schema = config.use_json_schema,
            "Configured chat completion provider"
        );
        Ok(Self::with_transport(
            Box::new(http),
            config.model.clone(),
            config.use_json_schema,
        ))
    }

    /// Construct from environment configuration (`ProviderConfig::from_env`).
    pub fn from_env() -> Result<Self> {
        Self::new(&ProviderConfig::from_env()?)
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn analyze_text(&self, text: &str) -> Result<AnalysisResult> {
        self.analyze(AnalysisRequest::text(text)?).await
    }

    pub async fn analyze_screenshot(
        &self,
        image: Vec<u8>,
        mime_type: Option<&str>,
    ) -> Result<AnalysisResult> {
        self.analyze(AnalysisRequest::image(image, mime_type)?).await
    }

    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult> {
        let payload = build_chat_request(&request, &self.model, self.format.as_ref())?;

        let body = self.send_with_retry(&payload).await?;
        let content = parser::extract_content(&body)?;
        let result = self.format.parse_content(content).map_err(|e| {
            error!("Model reply did not match the expected shape: {}", e);
            e
        })?;

        info!(
            wrong = result.wrong.len(),
            unsolicited_advice = result.unsolicited_advice.len(),
            rude = result.rude.len(),
            "Analysis complete"
        );

        Ok(result)
    }

    async fn send_with_retry(&self, payload: &ChatCompletionRequest) -> Result<Value> {
        let transport = self.transport.as_ref();
        let format_name = self.format.name();
        let max_retries = self.retry.max_retries;
        let total_attempts = max_retries + 1;

        // The strategy iterator is only advanced once the condition has
        // accepted the error, so logging here fires once per real retry.
        let strategy = self.retry.delays().enumerate().map(move |(n, delay)| {
            warn!(
                "Rate limit hit. Retrying in {}ms (attempt {}/{})...",
                delay.as_millis(),
                n + 1,
                max_retries
            );
            delay
        });

        let mut attempt = 0u32;
        let outcome = RetryIf::spawn(
            strategy,
            move || {
                attempt += 1;
                let current = attempt;
                async move {
                    debug!(
                        attempt = current,
                        total_attempts,
                        format = format_name,
                        "Requesting analysis"
                    );
                    transport.send(payload).await
                }
            },
            Error::is_rate_limit,
        )
        .await;

        outcome.map_err(|e| {
            if e.is_rate_limit() {
                error!("Rate limit persisted after {} retries", max_retries);
            }
            e
        })
    }
}
