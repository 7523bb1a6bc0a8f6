use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use super::retry::Retryable;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Error, Debug)]
#[error("{message}")]
pub struct UpstreamError {
    pub status: Option<u16>,
    pub message: String,
}

impl UpstreamError {
    fn transport(err: reqwest::Error) -> Self {
        Self {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl Retryable for UpstreamError {
    fn status(&self) -> Option<u16> {
        self.status
    }
}

/// One chat message. `content` is either a plain string or a list of parts.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: serde_json::Value,
}

impl ChatMessage {
    pub fn user_text(text: &str) -> Self {
        Self {
            role: "user",
            content: json!(text),
        }
    }

    /// A user turn carrying a prompt and one inline image.
    pub fn user_with_image(text: &str, data_uri: &str) -> Self {
        Self {
            role: "user",
            content: json!([
                { "type": "text", "text": text },
                {
                    "type": "image_url",
                    "image_url": { "url": data_uri, "detail": "high" }
                }
            ]),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub model: String,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
}

impl ChatCompletion {
    /// Text of the first choice. `None` when there are no choices or the
    /// message content is null.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

/// Minimal client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(UpstreamError::transport)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, UpstreamError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::to_value(request).map_err(|e| UpstreamError {
            status: None,
            message: format!("Failed to encode request: {e}"),
        })?;
        body["model"] = json!(self.model);

        debug!(url = %url, model = %self.model, max_tokens = request.max_tokens, "Sending chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(UpstreamError::transport)?;

        let status = response.status();
        let text = response.text().await.map_err(UpstreamError::transport)?;

        if !status.is_success() {
            let preview: String = text.chars().take(500).collect();
            error!(
                status = status.as_u16(),
                body = %preview,
                "Completion API returned an error"
            );
            return Err(UpstreamError {
                status: Some(status.as_u16()),
                message: format!("API error {status}: {text}"),
            });
        }

        serde_json::from_str(&text).map_err(|e| UpstreamError {
            status: Some(status.as_u16()),
            message: format!("Malformed completion response: {e}"),
        })
    }
}
