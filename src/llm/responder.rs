use super::prompt::{SYSTEM_PROMPT, build_messages};
use super::{ChatBackend, ConversationHistory, HostedBackend, OllamaBackend, canned_reply};
use crate::config::Config;

/// Reachability of one backend tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendStatus {
    pub name: String,
    pub available: bool,
}

/// Snapshot of the fallback chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponderStatus {
    /// Backend tiers in the order they are tried
    pub backends: Vec<BackendStatus>,
}

impl ResponderStatus {
    /// Tier that would answer next, `None` meaning the canned table
    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.backends
            .iter()
            .find(|b| b.available)
            .map(|b| b.name.as_str())
    }
}

/// Tiered conversational responder
///
/// Tries each backend in order and falls back to canned keyword replies.
/// History only grows when a backend answers.
pub struct FallbackResponder {
    backends: Vec<Box<dyn ChatBackend>>,
    history: ConversationHistory,
    system_prompt: String,
}

impl std::fmt::Debug for FallbackResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackResponder")
            .field(
                "backends",
                &self.backends.iter().map(|b| b.name()).collect::<Vec<_>>(),
            )
            .field("history", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl FallbackResponder {
    /// Create a responder with no backends, keeping `window` exchanges
    #[must_use]
    pub fn new(window: usize) -> Self {
        Self {
            backends: Vec::new(),
            history: ConversationHistory::new(window),
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    /// Append a backend tier
    #[must_use]
    pub fn with_backend(mut self, backend: impl ChatBackend + 'static) -> Self {
        self.backends.push(Box::new(backend));
        self
    }

    /// Replace the persona prompt
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Build the configured chain: Ollama, then the hosted API when enabled
    /// and keyed
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let mut responder = Self::new(config.llm.context_window);

        if !config.llm.enable_llm {
            tracing::info!("llm disabled, using canned replies only");
            return responder;
        }

        responder = responder.with_backend(OllamaBackend::from_config(&config.llm));

        if config.llm.use_cloud_api {
            match &config.api_keys.openai {
                Some(key) => {
                    responder = responder.with_backend(HostedBackend::from_config(&config.llm, key));
                }
                None => tracing::warn!("use_cloud_api is set but no OpenAI API key is configured"),
            }
        }

        responder
    }

    /// Answer a command; never fails
    pub async fn respond(&mut self, command: &str, context: Option<&str>) -> String {
        for backend in &self.backends {
            if !backend.is_available().await {
                tracing::debug!(backend = backend.name(), "backend unavailable, skipping");
                continue;
            }

            let messages = build_messages(&self.system_prompt, context, &self.history, command);
            match backend.chat(&messages).await {
                Ok(reply) => {
                    tracing::info!(backend = backend.name(), "backend replied");
                    self.history.push_exchange(command, &reply);
                    return reply;
                }
                Err(e) => {
                    tracing::warn!(backend = backend.name(), error = %e, "backend failed, falling through");
                }
            }
        }

        tracing::debug!("no backend answered, using canned reply");
        canned_reply(command).to_string()
    }

    /// Probe every backend tier
    pub async fn status(&self) -> ResponderStatus {
        let mut backends = Vec::with_capacity(self.backends.len());
        for backend in &self.backends {
            backends.push(BackendStatus {
                name: backend.name().to_string(),
                available: backend.is_available().await,
            });
        }
        ResponderStatus { backends }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        tracing::info!("conversation history cleared");
    }

    #[must_use]
    pub const fn history(&self) -> &ConversationHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::llm::{BackendError, ChatMessage, DEFLECTION};

    struct Fixed(&'static str);

    #[async_trait]
    impl ChatBackend for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn chat(&self, _messages: &[ChatMessage]) -> Result<String, BackendError> {
            Ok(self.0.to_string())
        }
    }

    struct Down;

    #[async_trait]
    impl ChatBackend for Down {
        fn name(&self) -> &str {
            "down"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn chat(&self, _messages: &[ChatMessage]) -> Result<String, BackendError> {
            Err(BackendError::Timeout {
                backend: "down".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_failing_chat_falls_through() {
        let mut responder = FallbackResponder::new(5)
            .with_backend(Down)
            .with_backend(Fixed("ค่ะ"));

        assert_eq!(responder.respond("ไปเที่ยวไหนดี", None).await, "ค่ะ");
        assert_eq!(responder.history().len(), 2);
    }

    #[tokio::test]
    async fn test_no_backends_is_canned() {
        let mut responder = FallbackResponder::new(5);
        assert_eq!(responder.respond("ลองถามอะไรหน่อย", None).await, DEFLECTION);
        assert!(responder.history().is_empty());
    }

    #[tokio::test]
    async fn test_status_reports_active_tier() {
        let responder = FallbackResponder::new(5).with_backend(Fixed("x"));
        let status = responder.status().await;
        assert_eq!(status.active(), Some("fixed"));

        let status = FallbackResponder::new(5).status().await;
        assert_eq!(status.active(), None);
    }

    #[test]
    fn test_from_config_tiers() {
        let mut config = Config::default();
        config.llm.use_cloud_api = true;
        config.api_keys.openai = Some("sk-test".to_string());

        let responder = FallbackResponder::from_config(&config);
        let names: Vec<_> = responder.backends.iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["ollama", "hosted"]);

        config.llm.enable_llm = false;
        assert!(FallbackResponder::from_config(&config).backends.is_empty());
    }
}
