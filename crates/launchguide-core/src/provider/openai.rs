//! Provider for OpenAI-compatible `/chat/completions` endpoints.
//!
//! Requests structured output via `response_format: json_schema` and parses
//! the first choice's message content as JSON.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::trait_def::{ModelProvider, ProviderError, StructuredPrompt};

/// Connection settings for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    /// Base URL up to and excluding `/chat/completions`
    /// (e.g. `https://api.openai.com/v1`).
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Bearer token. Local gateways often need none.
    pub api_key: Option<String>,
    /// Wall time limit for a single HTTP request.
    pub request_timeout: Duration,
}

impl OpenAiSettings {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// [`ModelProvider`] backed by an OpenAI-compatible HTTP API.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    settings: OpenAiSettings,
}

impl OpenAiCompatibleProvider {
    pub fn new(settings: OpenAiSettings) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &OpenAiSettings {
        &self.settings
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ModelProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, prompt: &StructuredPrompt) -> Result<serde_json::Value, ProviderError> {
        let body = json!({
            "model": self.settings.model,
            "messages": [{ "role": "user", "content": prompt.prompt }],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": prompt.schema_name,
                    "schema": prompt.schema,
                    "strict": true,
                },
            },
        });

        let mut request = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.settings.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!(
            label = %prompt.label,
            model = %self.settings.model,
            "sending chat completion request"
        );

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = resp.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ProviderError::MissingContent)?;

        serde_json::from_str(strip_code_fence(&content)).map_err(ProviderError::MalformedContent)
    }
}

/// Remove a surrounding Markdown code fence (```json ... ```), if any.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
