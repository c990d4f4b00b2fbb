use std::time::Instant;

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};

use super::prompts::SYSTEM_PROMPT;
use super::{AiError, TextGenerator};
use crate::config::AiConfig;

/// OpenAI-compatible chat-completions client.
///
/// Built once at startup and shared; without an API key every call fails with
/// [`AiError::NotConfigured`] instead of reaching the network.
#[derive(Clone)]
pub struct HttpTextGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl HttpTextGenerator {
    pub fn new(config: &AiConfig) -> Result<Self, AiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| AiError::Transport(format!("failed to build HTTP client: {err}")))?;

        let endpoint = format!(
            "{}/v1/chat/completions",
            config.base_url.trim_end_matches('/')
        );

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint,
            model: config.model.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn request_body(&self, prompt: &str) -> JsonValue {
        json!({
            "model": self.model,
            "temperature": 0.3,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt }
            ]
        })
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::NotConfigured)?;

        let started = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|err| AiError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                target: "workforce::ai",
                status = status.as_u16(),
                "AI provider returned non-success status"
            );
            return Err(AiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: JsonValue = response
            .json()
            .await
            .map_err(|err| AiError::InvalidResponse(err.to_string()))?;

        let content = body
            .pointer("/choices/0/message/content")
            .and_then(JsonValue::as_str)
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .ok_or(AiError::EmptyResponse)?;

        debug!(
            target: "workforce::ai",
            model = %self.model,
            latency_ms = started.elapsed().as_millis() as u64,
            "AI provider responded"
        );

        Ok(content.to_string())
    }
}
