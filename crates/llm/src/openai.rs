use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::{CompletionRequest, LanguageModel, LlmError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Chat-completions client for OpenAI-compatible endpoints.
#[derive(Clone)]
pub struct OpenAiChatModel {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiChatModel {
    pub fn new(config: OpenAiConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn with_default_client(config: OpenAiConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(6))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| LlmError::Transport(err.to_string()))?;
        Ok(Self::new(config, client))
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let payload = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user }
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| LlmError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let data: Value = response
            .json()
            .await
            .map_err(|err| LlmError::Parse(err.to_string()))?;

        let content = extract_content(&data)?;
        debug!(model = %self.config.model, chars = content.len(), "completion received");
        Ok(content)
    }
}

fn extract_content(data: &Value) -> Result<String, LlmError> {
    let content = data
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();

    if content.is_empty() {
        Err(LlmError::EmptyResponse)
    } else {
        Ok(content.to_string())
    }
}
