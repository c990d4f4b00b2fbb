//! Generative-AI provider seam: prompt in, text out.

mod client;
pub mod prompts;

pub use client::HttpTextGenerator;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Anything that can turn a prompt into text. Implementations own their
/// transport, timeouts, and credentials.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AiError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("AI provider is not configured (set AI_API_KEY)")]
    NotConfigured,
    #[error("AI provider request failed: {0}")]
    Transport(String),
    #[error("AI provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("AI provider returned an empty completion")]
    EmptyResponse,
    #[error("AI provider returned unparseable content: {0}")]
    InvalidResponse(String),
}

/// Strips a surrounding Markdown code fence (with or without a language tag)
/// and outer whitespace.
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Parses a JSON completion into `T`, tolerating code fences.
pub fn parse_json_reply<T: DeserializeOwned>(content: &str) -> Result<T, AiError> {
    serde_json::from_str(strip_code_fence(content))
        .map_err(|err| AiError::InvalidResponse(err.to_string()))
}
