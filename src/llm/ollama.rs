//! Local Ollama backend

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{BackendError, ChatBackend, ChatMessage, error_body};
use crate::config::LlmConfig;

const BACKEND: &str = "ollama";

/// Model downloads can take minutes
const PULL_TIMEOUT: Duration = Duration::from_secs(300);

/// Ollama chat client
#[derive(Debug, Clone)]
pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    probe_timeout: Duration,
    request_timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    name: &'a str,
    stream: bool,
}

impl OllamaBackend {
    /// Create a backend for `model` served at `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let defaults = LlmConfig::default();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
            probe_timeout: defaults.probe_timeout,
            request_timeout: defaults.request_timeout,
        }
    }

    /// Create from the LLM configuration
    #[must_use]
    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(config.ollama_url.clone(), config.model_name.clone())
            .with_sampling(config.temperature, config.max_tokens)
            .with_timeouts(config.probe_timeout, config.request_timeout)
    }

    /// Set temperature and the completion token cap
    #[must_use]
    pub const fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Set the probe and chat timeouts
    #[must_use]
    pub const fn with_timeouts(mut self, probe: Duration, request: Duration) -> Self {
        self.probe_timeout = probe;
        self.request_timeout = request;
        self
    }

    /// Configured model tag
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// List models the server has locally
    ///
    /// # Errors
    ///
    /// Returns error if the server is unreachable or answers with a failure
    pub async fn list_models(&self) -> Result<Vec<String>, BackendError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(self.probe_timeout)
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

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| BackendError::from_reqwest(BACKEND, &e))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Whether `name` refers to the configured model (`llama3` ≡ `llama3:latest`)
    fn is_configured_model(&self, name: &str) -> bool {
        name == self.model
            || name
                .strip_suffix(":latest")
                .is_some_and(|base| base == self.model)
    }

    /// Download the configured model
    ///
    /// # Errors
    ///
    /// Returns error if the pull request fails
    pub async fn pull_model(&self) -> Result<(), BackendError> {
        tracing::info!(model = %self.model, "pulling model");

        let response = self
            .client
            .post(format!("{}/api/pull", self.base_url))
            .json(&PullRequest {
                name: &self.model,
                stream: false,
            })
            .timeout(PULL_TIMEOUT)
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

        tracing::info!(model = %self.model, "model pulled");
        Ok(())
    }
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn is_available(&self) -> bool {
        match self.list_models().await {
            Ok(models) => {
                let loaded = models.iter().any(|name| self.is_configured_model(name));
                if !loaded {
                    tracing::debug!(model = %self.model, "ollama reachable but model not loaded");
                }
                loaded
            }
            Err(e) => {
                tracing::debug!(error = %e, "ollama not available");
                false
            }
        }
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, BackendError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .timeout(self.request_timeout)
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

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::from_reqwest(BACKEND, &e))?;

        body.message
            .map(|m| m.content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| BackendError::EmptyResponse {
                backend: BACKEND.to_string(),
            })
    }
}
