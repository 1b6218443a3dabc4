//! Configuration management for the Yuki gateway
//!
//! Priority: env > config file > default.

pub mod file;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use self::file::YukiConfigFile;
use crate::{Error, Result};

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Wake phrase and data files
    pub assistant: AssistantConfig,

    /// Conversational fallback
    pub llm: LlmConfig,

    /// API keys
    pub api_keys: ApiKeys,

    /// Weather lookup
    pub weather: WeatherConfig,

    /// Application name → executable or bundle path
    pub applications: BTreeMap<String, PathBuf>,

    /// Web service key → home URL
    pub web_services: BTreeMap<String, String>,

    /// Search engine key → URL template with `{query}`
    pub search_engines: BTreeMap<String, String>,

    /// Config file this configuration was loaded from, used for persistence
    pub config_path: Option<PathBuf>,
}

/// Assistant identity and data files
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Primary wake phrase
    pub wake_word: String,

    /// Additional wake phrases
    pub alternative_wake_words: Vec<String>,

    /// Explicit `commands.json` location
    pub commands_path: Option<PathBuf>,

    /// Explicit `responses.json` location
    pub responses_path: Option<PathBuf>,

    /// TTS command line; `None` logs speech instead
    pub tts_command: Option<String>,
}

/// Fallback responder configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Try LLM backends at all
    pub enable_llm: bool,

    /// Ollama server base URL
    pub ollama_url: String,

    /// Ollama model tag (e.g. "llama3.2:1b")
    pub model_name: String,

    /// Completion token cap
    pub max_tokens: u32,

    /// Sampling temperature (0.0 to 2.0)
    pub temperature: f32,

    /// Exchanges kept in conversation history
    pub context_window: usize,

    /// Try the hosted backend after the local one
    pub use_cloud_api: bool,

    /// Hosted model identifier
    pub cloud_model: String,

    /// Hosted OpenAI-compatible base URL
    pub cloud_base_url: String,

    /// Liveness probe timeout
    pub probe_timeout: Duration,

    /// Chat request timeout
    pub request_timeout: Duration,
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub openai: Option<String>,
    pub weather: Option<String>,
}

/// Weather lookup configuration
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    /// Timeline API base URL
    pub api_url: String,

    /// Location queried by default
    pub default_location: String,

    /// Request timeout
    pub timeout: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            wake_word: "ยูกิ".to_string(),
            alternative_wake_words: vec!["yuki".to_string()],
            commands_path: None,
            responses_path: None,
            tts_command: None,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enable_llm: true,
            ollama_url: "http://localhost:11434".to_string(),
            model_name: "llama3.2:1b".to_string(),
            max_tokens: 500,
            temperature: 0.7,
            context_window: 10,
            use_cloud_api: false,
            cloud_model: "gpt-3.5-turbo".to_string(),
            cloud_base_url: "https://api.openai.com".to_string(),
            probe_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_url:
                "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline"
                    .to_string(),
            default_location: "Thailand".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assistant: AssistantConfig::default(),
            llm: LlmConfig::default(),
            api_keys: ApiKeys::default(),
            weather: WeatherConfig::default(),
            applications: BTreeMap::new(),
            web_services: default_web_services(),
            search_engines: default_search_engines(),
            config_path: None,
        }
    }
}

fn string_map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Built-in web services opened by `open_*` pattern actions
#[must_use]
pub fn default_web_services() -> BTreeMap<String, String> {
    string_map(&[
        ("google", "https://www.google.com"),
        ("youtube", "https://www.youtube.com"),
        ("facebook", "https://www.facebook.com"),
        ("instagram", "https://www.instagram.com"),
        ("chatgpt", "https://chat.openai.com"),
        ("gemini", "https://gemini.google.com"),
    ])
}

/// Built-in search engines
#[must_use]
pub fn default_search_engines() -> BTreeMap<String, String> {
    string_map(&[
        ("google", "https://www.google.com/search?q={query}"),
        ("youtube", "https://www.youtube.com/results?search_query={query}"),
        ("bing", "https://www.bing.com/search?q={query}"),
        ("duckduckgo", "https://duckduckgo.com/?q={query}"),
    ])
}

impl Config {
    /// Load configuration from the given file (or the standard path) and the
    /// process environment
    ///
    /// # Errors
    ///
    /// Returns error if the resulting configuration is invalid
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).or_else(file::config_file_path);
        let fc = path
            .as_deref()
            .map(file::load_config_file)
            .unwrap_or_default();

        Self::from_sources(fc, |key| std::env::var(key).ok(), path)
    }

    /// Build configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if the resulting configuration is invalid
    pub fn from_sources(
        fc: YukiConfigFile,
        env: impl Fn(&str) -> Option<String>,
        config_path: Option<PathBuf>,
    ) -> Result<Self> {
        let defaults = Self::default();

        let assistant = AssistantConfig {
            wake_word: env("YUKI_WAKE_WORD")
                .or(fc.assistant.wake_word)
                .unwrap_or(defaults.assistant.wake_word),
            alternative_wake_words: fc
                .assistant
                .alternative_wake_words
                .unwrap_or(defaults.assistant.alternative_wake_words),
            commands_path: env("YUKI_COMMANDS_PATH")
                .or(fc.assistant.commands_path)
                .map(PathBuf::from),
            responses_path: env("YUKI_RESPONSES_PATH")
                .or(fc.assistant.responses_path)
                .map(PathBuf::from),
            tts_command: env("YUKI_TTS_COMMAND")
                .or(fc.assistant.tts_command)
                .filter(|c| !c.trim().is_empty()),
        };

        let d = defaults.llm;
        let llm = LlmConfig {
            enable_llm: fc.llm.enable_llm.unwrap_or(d.enable_llm),
            ollama_url: env("OLLAMA_URL")
                .or(fc.llm.ollama_url)
                .unwrap_or(d.ollama_url),
            model_name: env("YUKI_LLM_MODEL")
                .or(fc.llm.model_name)
                .unwrap_or(d.model_name),
            max_tokens: fc.llm.max_tokens.unwrap_or(d.max_tokens),
            temperature: fc.llm.temperature.unwrap_or(d.temperature),
            context_window: fc.llm.context_window.unwrap_or(d.context_window),
            use_cloud_api: fc.llm.use_cloud_api.unwrap_or(d.use_cloud_api),
            cloud_model: fc.llm.cloud_model.unwrap_or(d.cloud_model),
            cloud_base_url: fc.llm.cloud_base_url.unwrap_or(d.cloud_base_url),
            probe_timeout: fc
                .llm
                .probe_timeout_secs
                .map_or(d.probe_timeout, Duration::from_secs),
            request_timeout: fc
                .llm
                .request_timeout_secs
                .map_or(d.request_timeout, Duration::from_secs),
        };

        let api_keys = ApiKeys {
            openai: env("OPENAI_API_KEY")
                .or(fc.api_keys.openai)
                .filter(|k| !k.is_empty()),
            weather: env("WEATHER_API_KEY")
                .or(fc.api_keys.weather)
                .filter(|k| !k.is_empty()),
        };

        let weather = WeatherConfig {
            api_url: fc.weather.api_url.unwrap_or(defaults.weather.api_url),
            default_location: fc
                .weather
                .default_location
                .unwrap_or(defaults.weather.default_location),
            timeout: defaults.weather.timeout,
        };

        let mut web_services = defaults.web_services;
        web_services.extend(fc.web_services);

        let mut search_engines = defaults.search_engines;
        search_engines.extend(fc.search_engines);

        let config = Self {
            assistant,
            llm,
            api_keys,
            weather,
            applications: fc
                .applications
                .into_iter()
                .map(|(name, path)| (name, PathBuf::from(path)))
                .collect(),
            web_services,
            search_engines,
            config_path,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns error describing the first invalid setting
    pub fn validate(&self) -> Result<()> {
        if self.assistant.wake_word.trim().is_empty() {
            return Err(Error::Config("assistant.wake_word must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(Error::Config(format!(
                "llm.temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }
        if self.llm.context_window == 0 {
            return Err(Error::Config("llm.context_window must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Pattern file: the configured path, else `commands.json` next to the config file
    #[must_use]
    pub fn commands_path(&self) -> Option<PathBuf> {
        self.data_file(self.assistant.commands_path.as_ref(), "commands.json")
    }

    /// Response template file: the configured path, else `responses.json`
    /// next to the config file
    #[must_use]
    pub fn responses_path(&self) -> Option<PathBuf> {
        self.data_file(self.assistant.responses_path.as_ref(), "responses.json")
    }

    fn data_file(&self, configured: Option<&PathBuf>, name: &str) -> Option<PathBuf> {
        if let Some(path) = configured {
            return Some(path.clone());
        }
        self.config_path
            .as_deref()
            .and_then(Path::parent)
            .map(|dir| dir.join(name))
            .filter(|path| path.exists())
    }
}
