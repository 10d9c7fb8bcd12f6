//! Claude client for the Anthropic Messages API

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::CompletionConfig;

const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 2048;

/// Why a completion could not be produced
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Completion API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed completion response: {0}")]
    Malformed(String),

    #[error("Completion request timed out")]
    Timeout,
}

/// Prompt text in, generated text out
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

pub type SharedCompletion = Arc<dyn CompletionBackend>;

/// Client for the Anthropic Claude Messages API
#[derive(Clone)]
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    api_url: String,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

/// Request body for the Messages API
#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message>,
}

/// Individual content block within a response
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Response from the Messages API
#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

/// Error detail from the Messages API
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl ClaudeClient {
    pub fn new(config: &CompletionConfig) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CompletionError::Http(e.to_string()))?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            api_url: config.api_url.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a single user message and return the first text block
    pub async fn message(&self, user_message: &str) -> Result<String, CompletionError> {
        let request = ApiRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: user_message.to_string(),
            }],
        };

        let response = self
            .http
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout
                } else {
                    CompletionError::Http(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiError>(&body) {
                Ok(api_err) => api_err.error.message,
                Err(_) => body,
            };
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed = response.json::<ApiResponse>().await.map_err(|e| {
            if e.is_timeout() {
                CompletionError::Timeout
            } else {
                CompletionError::Malformed(e.to_string())
            }
        })?;
        extract_text(parsed)
    }
}

/// First non-blank text block of a response
fn extract_text(response: ApiResponse) -> Result<String, CompletionError> {
    response
        .content
        .into_iter()
        .find_map(|block| match block {
            ContentBlock::Text { text } if !text.trim().is_empty() => Some(text),
            _ => None,
        })
        .ok_or_else(|| CompletionError::Malformed("no text content in response".to_string()))
}

#[async_trait]
impl CompletionBackend for ClaudeClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.message(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn text_block_is_extracted() {
        let response: ApiResponse = serde_json::from_str(
            r#"{"id":"msg_1","content":[{"type":"thinking","thinking":"..."},{"type":"text","text":"Explanation: ok"}],"stop_reason":"end_turn"}"#,
        )
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "Explanation: ok");
    }

    #[test]
    fn empty_content_is_malformed() {
        let response: ApiResponse =
            serde_json::from_str(r#"{"content":[{"type":"text","text":"  "}]}"#).unwrap();
        assert!(matches!(
            extract_text(response),
            Err(CompletionError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error() {
        let client = ClaudeClient::new(&CompletionConfig {
            api_key: "sk-test".into(),
            model: "test-model".into(),
            api_url: "http://127.0.0.1:1/v1/messages".into(),
            timeout: Duration::from_secs(2),
        })
        .unwrap();
        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(
            err,
            CompletionError::Http(_) | CompletionError::Timeout
        ));
    }
}
