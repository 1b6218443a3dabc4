//! TOML configuration file loading
//!
//! Supports `~/.config/yuki/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.
//! Writes go through `toml_edit` so hand-edited comments and layout survive.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use toml_edit::DocumentMut;

use crate::{Error, Result};

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct YukiConfigFile {
    /// Wake phrase and data file locations
    #[serde(default)]
    pub assistant: AssistantFileConfig,

    /// Conversational fallback configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// Weather lookup configuration
    #[serde(default)]
    pub weather: WeatherFileConfig,

    /// Application name → executable or bundle path
    #[serde(default)]
    pub applications: BTreeMap<String, String>,

    /// Web service key → home URL, merged over the built-in services
    #[serde(default)]
    pub web_services: BTreeMap<String, String>,

    /// Search engine key → URL template with `{query}`, merged over built-ins
    #[serde(default)]
    pub search_engines: BTreeMap<String, String>,
}

/// Assistant identity and data files
#[derive(Debug, Default, Deserialize)]
pub struct AssistantFileConfig {
    /// Primary wake phrase (e.g. "ยูกิ")
    pub wake_word: Option<String>,

    /// Additional wake phrases
    pub alternative_wake_words: Option<Vec<String>>,

    /// Path to `commands.json`
    pub commands_path: Option<String>,

    /// Path to `responses.json`
    pub responses_path: Option<String>,

    /// TTS command line, text is appended as the last argument
    pub tts_command: Option<String>,
}

/// LLM-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    pub enable_llm: Option<bool>,
    pub ollama_url: Option<String>,
    pub model_name: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub context_window: Option<usize>,
    pub use_cloud_api: Option<bool>,
    pub cloud_model: Option<String>,
    pub cloud_base_url: Option<String>,
    pub probe_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub weather: Option<String>,
}

/// Weather lookup configuration
#[derive(Debug, Default, Deserialize)]
pub struct WeatherFileConfig {
    /// Timeline API base URL; the location is appended as a path segment
    pub api_url: Option<String>,

    /// Location queried when the command names none
    pub default_location: Option<String>,
}

/// Load a TOML config file
///
/// Returns `YukiConfigFile::default()` if the file doesn't exist or can't be parsed.
#[must_use]
pub fn load_config_file(path: &Path) -> YukiConfigFile {
    if !path.exists() {
        return YukiConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                YukiConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            YukiConfigFile::default()
        }
    }
}

/// Return the config directory: `~/.config/yuki`
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("yuki"))
}

/// Return the config file path: `~/.config/yuki/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Read a config file for editing; a missing file is an empty document
///
/// # Errors
///
/// Returns error if the file exists but cannot be read or parsed
pub fn read_document(path: &Path) -> Result<DocumentMut> {
    if !path.exists() {
        return Ok(DocumentMut::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(content.parse::<DocumentMut>()?)
}

/// Write an edited document, creating parent directories
///
/// # Errors
///
/// Returns error if the directory or file cannot be written
pub fn write_document(path: &Path, doc: &DocumentMut) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, doc.to_string())?;
    Ok(())
}

/// Set `section.key` in a document, creating the section table if needed
///
/// # Errors
///
/// Returns error if `section` exists but is not a table
pub fn set_value(
    doc: &mut DocumentMut,
    section: &str,
    key: &str,
    value: impl Into<toml_edit::Value>,
) -> Result<()> {
    section_table(doc, section)?.insert(key, toml_edit::value(value));
    Ok(())
}

/// Remove `section.key` from a document, returning whether it was present
pub fn remove_value(doc: &mut DocumentMut, section: &str, key: &str) -> bool {
    doc.get_mut(section)
        .and_then(toml_edit::Item::as_table_like_mut)
        .and_then(|table| table.remove(key))
        .is_some()
}

/// Add, replace or (with `None`) remove an entry of the `[applications]` table
///
/// # Errors
///
/// Returns error if the config file cannot be read, parsed or written
pub fn persist_application(path: &Path, name: &str, app_path: Option<&Path>) -> Result<()> {
    let mut doc = read_document(path)?;

    match app_path {
        Some(app_path) => {
            set_value(&mut doc, "applications", name, app_path.display().to_string())?;
        }
        None => {
            remove_value(&mut doc, "applications", name);
        }
    }

    write_document(path, &doc)?;
    tracing::debug!(path = %path.display(), name, "persisted application table");
    Ok(())
}

fn section_table<'a>(doc: &'a mut DocumentMut, section: &str) -> Result<&'a mut toml_edit::Table> {
    doc.entry(section)
        .or_insert(toml_edit::table())
        .as_table_mut()
        .ok_or_else(|| Error::Config(format!("[{section}] is not a table")))
}
