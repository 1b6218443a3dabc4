//! Shared test utilities

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use yuki_gateway::llm::{BackendError, ChatBackend, ChatMessage};
use yuki_gateway::voice::Speaker;
use yuki_gateway::{Config, FallbackResponder, Launcher, Router};

/// Launcher that records what it was asked to open
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    pub urls: Mutex<Vec<String>>,
    pub apps: Mutex<Vec<PathBuf>>,
}

impl RecordingLauncher {
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    pub fn apps(&self) -> Vec<PathBuf> {
        self.apps.lock().unwrap().clone()
    }

    pub fn is_untouched(&self) -> bool {
        self.urls().is_empty() && self.apps().is_empty()
    }
}

impl Launcher for RecordingLauncher {
    fn open_url(&self, url: &str) -> yuki_gateway::Result<()> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(())
    }

    fn launch_app(&self, path: &Path) -> yuki_gateway::Result<()> {
        self.apps.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn exists(&self, _path: &Path) -> bool {
        true
    }

    fn which(&self, _program: &str) -> Option<PathBuf> {
        None
    }
}

/// Chat backend with a fixed answer and a call counter
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    pub name: &'static str,
    pub available: bool,
    pub reply: Option<&'static str>,
    pub calls: Arc<AtomicUsize>,
    pub seen: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl ScriptedBackend {
    pub fn answering(name: &'static str, reply: &'static str) -> Self {
        Self {
            name,
            available: true,
            reply: Some(reply),
            calls: Arc::default(),
            seen: Arc::default(),
        }
    }

    pub fn unavailable(name: &'static str) -> Self {
        Self {
            name,
            available: false,
            reply: None,
            calls: Arc::default(),
            seen: Arc::default(),
        }
    }

    pub fn failing(name: &'static str) -> Self {
        Self {
            name,
            available: true,
            reply: None,
            calls: Arc::default(),
            seen: Arc::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_messages(&self) -> Vec<ChatMessage> {
        self.seen.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    fn name(&self) -> &str {
        self.name
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(messages.to_vec());
        self.reply
            .map(str::to_string)
            .ok_or_else(|| BackendError::Unreachable {
                backend: self.name.to_string(),
                reason: "scripted failure".to_string(),
            })
    }
}

/// Speaker that records spoken text
#[derive(Debug, Default)]
pub struct RecordingSpeaker {
    pub spoken: Mutex<Vec<String>>,
}

impl RecordingSpeaker {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl Speaker for RecordingSpeaker {
    async fn speak(&self, text: &str) -> yuki_gateway::Result<()> {
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Everything a router test needs to inspect afterwards
pub struct TestRouter {
    pub router: Router,
    pub launcher: Arc<RecordingLauncher>,
    pub speaker: Arc<RecordingSpeaker>,
    pub backend: ScriptedBackend,
}

/// Build a router on default config with recording collaborators and a
/// single scripted backend
pub fn test_router(backend: ScriptedBackend) -> TestRouter {
    let launcher = Arc::new(RecordingLauncher::default());
    let speaker = Arc::new(RecordingSpeaker::default());
    let config = Config::default();

    let router = Router::new(&config)
        .with_launcher(launcher.clone())
        .with_speaker(speaker.clone())
        .with_responder(FallbackResponder::new(config.llm.context_window).with_backend(backend.clone()));

    TestRouter {
        router,
        launcher,
        speaker,
        backend,
    }
}
