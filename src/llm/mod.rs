//! Conversational fallback
//!
//! Commands no classifier claims are answered by a chain of chat backends
//! (local Ollama, then a hosted OpenAI-compatible API) and finally a canned
//! keyword table. [`FallbackResponder`] owns the chain and the bounded
//! conversation history.

mod canned;
mod history;
mod ollama;
mod openai;
mod prompt;
mod responder;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use canned::{DEFLECTION, canned_reply};
pub use history::ConversationHistory;
pub use ollama::OllamaBackend;
pub use openai::HostedBackend;
pub use prompt::SYSTEM_PROMPT;
pub use responder::{BackendStatus, FallbackResponder, ResponderStatus};

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Why a backend tier failed
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection refused, DNS failure, or similar
    #[error("{backend} unreachable: {reason}")]
    Unreachable { backend: String, reason: String },

    /// Request exceeded its timeout
    #[error("{backend} timed out")]
    Timeout { backend: String },

    /// Non-success HTTP status
    #[error("{backend} returned {status}: {body}")]
    Status {
        backend: String,
        status: u16,
        body: String,
    },

    /// Success status with no usable content
    #[error("{backend} returned an empty response")]
    EmptyResponse { backend: String },

    /// Response body did not match the expected shape
    #[error("{backend} response could not be decoded: {reason}")]
    Decode { backend: String, reason: String },

    /// Backend is not configured for use
    #[error("{backend} is not available")]
    Unavailable { backend: String },
}

impl BackendError {
    /// Classify a transport error from `backend`
    #[must_use]
    pub fn from_reqwest(backend: &str, e: &reqwest::Error) -> Self {
        let backend = backend.to_string();
        if e.is_timeout() {
            Self::Timeout { backend }
        } else if e.is_decode() {
            Self::Decode {
                backend,
                reason: e.to_string(),
            }
        } else if let Some(status) = e.status() {
            Self::Status {
                backend,
                status: status.as_u16(),
                body: String::new(),
            }
        } else {
            Self::Unreachable {
                backend,
                reason: e.to_string(),
            }
        }
    }
}

/// A conversational backend tier
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Short name used in logs and status output
    fn name(&self) -> &str;

    /// Cheap reachability check, bounded by its own timeout
    async fn is_available(&self) -> bool;

    /// Send a full message list and return the assistant text
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, times out, or yields no content
    async fn chat(&self, messages: &[ChatMessage]) -> std::result::Result<String, BackendError>;
}

/// Read a failed response's body for logging, truncated
async fn error_body(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    body.chars().take(200).collect()
}
