//! Hosted OpenAI-compatible backend

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{BackendError, ChatBackend, ChatMessage, error_body};
use crate::config::LlmConfig;

const BACKEND: &str = "hosted";

/// Chat completions client for an OpenAI-compatible API
#[derive(Debug, Clone)]
pub struct HostedBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
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

impl HostedBackend {
    /// Create a backend for `model` at `base_url` (without the `/v1` suffix)
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let defaults = LlmConfig::default();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
            timeout: defaults.request_timeout,
        }
    }

    /// Create from the LLM configuration and an API key
    #[must_use]
    pub fn from_config(config: &LlmConfig, api_key: impl Into<String>) -> Self {
        Self::new(config.cloud_base_url.clone(), api_key, config.cloud_model.clone())
            .with_sampling(config.temperature, config.max_tokens)
            .with_timeout(config.request_timeout)
    }

    /// Set temperature and the completion token cap
    #[must_use]
    pub const fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ChatBackend for HostedBackend {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, BackendError> {
        if self.api_key.is_empty() {
            return Err(BackendError::Unavailable {
                backend: BACKEND.to_string(),
            });
        }

        let request = CompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(BACKEND, &e))?;

        if !response.status().is_success() {
            return Err(BackendError::Status {
                backend: BACKEND.to_string(),
                status: response.status().as_u16(),
                body: error_body(response).await,
            });
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| BackendError::from_reqwest(BACKEND, &e))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| BackendError::EmptyResponse {
                backend: BACKEND.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn test_chat_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-3.5-turbo",
                "max_tokens": 500
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": "ยินดีค่ะ" },
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = HostedBackend::new(server.uri(), "sk-test", "gpt-3.5-turbo");
        assert!(backend.is_available().await);
        let reply = backend.chat(&[ChatMessage::user("ขอบคุณ")]).await.unwrap();
        assert_eq!(reply, "ยินดีค่ะ");
    }

    #[tokio::test]
    async fn test_missing_key_unavailable() {
        let backend = HostedBackend::new("http://127.0.0.1:9", "", "gpt-3.5-turbo");
        assert!(!backend.is_available().await);
        assert!(matches!(
            backend.chat(&[ChatMessage::user("hi")]).await,
            Err(BackendError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let backend = HostedBackend::new(server.uri(), "sk-test", "gpt-3.5-turbo");
        let err = backend.chat(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, BackendError::Status { status: 429, .. }));
        assert!(err.to_string().contains("rate limited"));
    }
}
