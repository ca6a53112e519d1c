use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use thiserror::Error;

mod openai;

pub use openai::{
    OpenAiChatModel, OpenAiConfig, DEFAULT_BASE_URL as OPENAI_BASE_URL,
    DEFAULT_MODEL as OPENAI_MODEL,
};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("language model transport failed: {0}")]
    Transport(String),
    #[error("language model returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not parse language model output: {0}")]
    Parse(String),
    #[error("language model returned no content")]
    EmptyResponse,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature: 0.7,
            max_tokens: 300,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A text-completion backend. Every call site keeps a non-model fallback, so
/// implementations should fail fast rather than retry.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*\n?(.*?)\n?\s*```\s*$").expect("code fence regex is valid")
});

/// Removes a surrounding markdown code fence, if any.
pub fn strip_code_fence(text: &str) -> &str {
    match CODE_FENCE.captures(text).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => text.trim(),
    }
}

/// Parses model output as JSON, tolerating a code fence around it.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    serde_json::from_str(strip_code_fence(text)).map_err(|err| LlmError::Parse(err.to_string()))
}
