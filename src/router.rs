//! Command router
//!
//! One utterance at a time: normalize, gate on the wake phrase, then try the
//! pattern table, the trigger classifiers in priority order, and finally the
//! conversational fallback. Every path ends in a reply string; handler
//! failures are turned into apologies where they happen.

use std::sync::Arc;

use chrono::{DateTime, Local, Timelike};

use crate::commands::triggers::{self, ClassifierId};
use crate::commands::{
    Action, AppHandler, MediaHandler, PatternTable, ResponseKey, ResponseTemplates, WeatherClient,
    WebHandler,
};
use crate::config::Config;
use crate::launcher::{Launcher, SystemLauncher};
use crate::llm::FallbackResponder;
use crate::normalize::normalize;
use crate::voice::{CommandSpeaker, LogSpeaker, Speaker, WakeClass, WakeGate};

/// Reply for speech not addressed to the assistant
pub const INERT_REPLY: &str = "...";

/// Farewell spoken on shutdown
pub const FAREWELL: &str = "ยูกิกำลังปิดตัวลงค่ะ";

/// Context note passed to chat backends
const VOICE_CONTEXT: &str =
    "You are being spoken to through a voice assistant. Keep responses concise and natural for speech.";

/// Router shared with a concurrent audio capture loop
pub type SharedRouter = Arc<tokio::sync::Mutex<Router>>;

/// Stage that produced a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Empty input or speech without the wake phrase
    Inert,
    /// Bare wake phrase acknowledgement
    Wake,
    /// Wake phrase followed by nothing usable
    NoCommand,
    /// Pattern table action
    Pattern(Action),
    WebSearch,
    WebService,
    App,
    Media,
    /// Conversational fallback
    Conversation,
}

impl From<ClassifierId> for Route {
    fn from(id: ClassifierId) -> Self {
        match id {
            ClassifierId::WebSearch => Self::WebSearch,
            ClassifierId::WebService => Self::WebService,
            ClassifierId::App => Self::App,
            ClassifierId::Media => Self::Media,
        }
    }
}

/// Result of processing one utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Text to speak or print
    pub text: String,
    /// Stage that produced it
    pub route: Route,
}

impl Reply {
    fn new(text: impl Into<String>, route: Route) -> Self {
        Self {
            text: text.into(),
            route,
        }
    }

    /// Whether the caller should stop after delivering this reply
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.route == Route::Pattern(Action::Shutdown)
    }
}

/// Spoken clock time, e.g. "ขณะนี้เวลา 9 นาฬิกา 5 นาที 30 วินาที"
#[must_use]
pub fn format_thai_time(time: &impl Timelike) -> String {
    format!(
        "ขณะนี้เวลา {} นาฬิกา {} นาที {} วินาที",
        time.hour(),
        time.minute(),
        time.second()
    )
}

/// Command router owning all per-process assistant state
pub struct Router {
    gate: WakeGate,
    patterns: PatternTable,
    responses: ResponseTemplates,
    web: WebHandler,
    apps: AppHandler,
    media: MediaHandler,
    weather: WeatherClient,
    responder: FallbackResponder,
    launcher: Arc<dyn Launcher>,
    speaker: Arc<dyn Speaker>,
    last_command_at: Option<DateTime<Local>>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("gate", &self.gate)
            .field("patterns", &self.patterns.len())
            .field("responder", &self.responder)
            .field("last_command_at", &self.last_command_at)
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Build a router from configuration
    ///
    /// Pattern and response files are loaded here; problems with them are
    /// logged and the built-in tables used instead.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let speaker: Arc<dyn Speaker> = match config.assistant.tts_command.as_deref() {
            Some(command) => match CommandSpeaker::from_command_line(command) {
                Ok(speaker) => Arc::new(speaker),
                Err(e) => {
                    tracing::warn!(error = %e, "invalid TTS command, speech will only be logged");
                    Arc::new(LogSpeaker)
                }
            },
            None => Arc::new(LogSpeaker),
        };

        Self {
            gate: WakeGate::new(
                &config.assistant.wake_word,
                &config.assistant.alternative_wake_words,
            ),
            patterns: PatternTable::load(config.commands_path().as_deref()),
            responses: ResponseTemplates::load(config.responses_path().as_deref()),
            web: WebHandler::new(config.web_services.clone(), config.search_engines.clone()),
            apps: AppHandler::new(config.applications.clone(), config.config_path.clone()),
            media: MediaHandler,
            weather: WeatherClient::new(&config.weather, config.api_keys.weather.clone()),
            responder: FallbackResponder::from_config(config),
            launcher: Arc::new(SystemLauncher),
            speaker,
            last_command_at: None,
        }
    }

    #[must_use]
    pub fn with_launcher(mut self, launcher: Arc<dyn Launcher>) -> Self {
        self.launcher = launcher;
        self
    }

    #[must_use]
    pub fn with_speaker(mut self, speaker: Arc<dyn Speaker>) -> Self {
        self.speaker = speaker;
        self
    }

    #[must_use]
    pub fn with_responder(mut self, responder: FallbackResponder) -> Self {
        self.responder = responder;
        self
    }

    #[must_use]
    pub fn with_patterns(mut self, patterns: PatternTable) -> Self {
        self.patterns = patterns;
        self
    }

    #[must_use]
    pub fn with_responses(mut self, responses: ResponseTemplates) -> Self {
        self.responses = responses;
        self
    }

    /// Process one raw utterance
    pub async fn process(&mut self, text: &str) -> Reply {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return Reply::new("", Route::Inert);
        }

        match self.gate.classify(&normalized) {
            WakeClass::Unrelated => {
                tracing::debug!(text = %normalized, "not addressed to assistant");
                Reply::new(INERT_REPLY, Route::Inert)
            }
            WakeClass::BareWake => {
                let ack = self.gate.acknowledge();
                tracing::info!(calls = self.gate.call_count(), "bare wake call");
                Reply::new(ack, Route::Wake)
            }
            WakeClass::PrefixedCommand => {
                let command = self.gate.strip_wake_prefix(&normalized);
                if command.is_empty() {
                    return Reply::new(self.responses.get(ResponseKey::NoCommand), Route::NoCommand);
                }

                self.last_command_at = Some(Local::now());
                tracing::info!(command = %command, "routing command");
                self.route(&command).await
            }
        }
    }

    /// Process one utterance and return only the reply text
    pub async fn respond_text(&mut self, text: &str) -> String {
        self.process(text).await.text
    }

    async fn route(&mut self, command: &str) -> Reply {
        if let Some(entry) = self.patterns.find(command) {
            tracing::debug!(pattern = entry.pattern(), action = %entry.action().tag(), "pattern matched");
            let action = entry.action().clone();
            let text = self.run_action(&action).await;
            return Reply::new(text, Route::Pattern(action));
        }

        if let Some(hit) = triggers::classify(command) {
            tracing::debug!(classifier = ?hit.classifier, trigger = hit.trigger, "classifier matched");
            let launcher = self.launcher.as_ref();
            let text = match hit.classifier {
                ClassifierId::WebSearch => self
                    .web
                    .search(command, hit.trigger, launcher)
                    .unwrap_or_else(|| self.responses.get(ResponseKey::NoQuery).to_string()),
                ClassifierId::WebService => self.web.open_site(command, hit.trigger, launcher),
                ClassifierId::App => self.apps.open(command, hit.trigger, launcher),
                ClassifierId::Media => self.media.play(command, hit.trigger, launcher),
            };
            return Reply::new(text, hit.classifier.into());
        }

        let text = self.responder.respond(command, Some(VOICE_CONTEXT)).await;
        Reply::new(text, Route::Conversation)
    }

    async fn run_action(&self, action: &Action) -> String {
        match action {
            Action::Time => format_thai_time(&Local::now()),
            Action::Greeting => self.responses.get(ResponseKey::Greeting).to_string(),
            Action::Name => self.responses.get(ResponseKey::Name).to_string(),
            Action::Weather => self.weather.report().await,
            Action::Shutdown => {
                tracing::info!("shutdown requested");
                if let Err(e) = self.speaker.speak(FAREWELL).await {
                    tracing::warn!(error = %e, "failed to speak farewell");
                }
                FAREWELL.to_string()
            }
            Action::OpenWeb(key) => self.web.open_service(key, self.launcher.as_ref()),
            Action::Reply(text) => text.clone(),
        }
    }

    /// Reset the bare wake call counter
    pub const fn reset_calls(&mut self) {
        self.gate.reset_calls();
    }

    #[must_use]
    pub const fn wake_gate(&self) -> &WakeGate {
        &self.gate
    }

    #[must_use]
    pub const fn responses(&self) -> &ResponseTemplates {
        &self.responses
    }

    /// Pattern table, for in-memory admin edits
    pub const fn patterns_mut(&mut self) -> &mut PatternTable {
        &mut self.patterns
    }

    #[must_use]
    pub const fn apps(&self) -> &AppHandler {
        &self.apps
    }

    /// Application table, for admin edits
    pub const fn apps_mut(&mut self) -> &mut AppHandler {
        &mut self.apps
    }

    #[must_use]
    pub const fn responder(&self) -> &FallbackResponder {
        &self.responder
    }

    pub const fn responder_mut(&mut self) -> &mut FallbackResponder {
        &mut self.responder
    }

    /// When the last wake-prefixed command was routed
    #[must_use]
    pub fn last_command_at(&self) -> Option<DateTime<Local>> {
        self.last_command_at
    }
}
