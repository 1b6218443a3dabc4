//! Interactive first-run setup wizard (`yuki setup`)

use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Input, Select};

use crate::config::LlmConfig;
use crate::config::file::{self, YukiConfigFile};

/// Run the interactive setup wizard
///
/// Values are written into the existing file with `toml_edit`, so sections
/// the wizard does not ask about (applications, web services) are kept.
///
/// # Errors
///
/// Returns error if user input fails or config cannot be written
pub fn run_setup(path: Option<&Path>) -> anyhow::Result<()> {
    println!("Yuki Setup\n");

    let config_path = path
        .map(Path::to_path_buf)
        .or_else(file::config_file_path)
        .unwrap_or_else(|| PathBuf::from("~/.config/yuki/config.toml"));

    let existing = file::load_config_file(&config_path);
    if config_path.exists() {
        println!("Existing config found at {}\n", config_path.display());
    }

    let mut doc = file::read_document(&config_path)?;

    // 1. Wake word
    let wake_word: String = Input::new()
        .with_prompt("Wake word")
        .default(
            existing
                .assistant
                .wake_word
                .clone()
                .unwrap_or_else(|| "ยูกิ".to_string()),
        )
        .interact_text()?;
    file::set_value(&mut doc, "assistant", "wake_word", wake_word)?;

    // 2. Conversational backend
    let modes = [
        "Local Ollama",
        "Local Ollama with OpenAI fallback",
        "Canned replies only",
    ];
    let default_mode = match (existing.llm.enable_llm, existing.llm.use_cloud_api) {
        (Some(false), _) => 2,
        (_, Some(true)) => 1,
        _ => 0,
    };
    let mode = Select::new()
        .with_prompt("Conversation backend")
        .items(&modes)
        .default(default_mode)
        .interact()?;

    file::set_value(&mut doc, "llm", "enable_llm", mode != 2)?;
    file::set_value(&mut doc, "llm", "use_cloud_api", mode == 1)?;

    if mode != 2 {
        let defaults = LlmConfig::default();

        let ollama_url: String = Input::new()
            .with_prompt("Ollama URL")
            .default(existing.llm.ollama_url.clone().unwrap_or(defaults.ollama_url))
            .interact_text()?;
        file::set_value(&mut doc, "llm", "ollama_url", ollama_url)?;

        let model: String = Input::new()
            .with_prompt("Ollama model")
            .default(existing.llm.model_name.clone().unwrap_or(defaults.model_name))
            .interact_text()?;
        file::set_value(&mut doc, "llm", "model_name", model)?;
    }

    // 3. API keys
    if mode == 1
        && let Some(key) = prompt_key("OpenAI", "OPENAI_API_KEY", existing.api_keys.openai.as_deref())?
    {
        file::set_value(&mut doc, "api_keys", "openai", key)?;
    }

    let want_weather = Confirm::new()
        .with_prompt("Configure weather lookups (Visual Crossing)?")
        .default(existing.api_keys.weather.is_some())
        .interact()?;
    if want_weather
        && let Some(key) =
            prompt_key("Weather", "WEATHER_API_KEY", existing.api_keys.weather.as_deref())?
    {
        file::set_value(&mut doc, "api_keys", "weather", key)?;
    }

    // 4. Speech output
    let tts_command: String = Input::new()
        .with_prompt("TTS command, text is appended (blank to only log speech)")
        .default(existing.assistant.tts_command.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;
    if tts_command.trim().is_empty() {
        file::remove_value(&mut doc, "assistant", "tts_command");
    } else {
        file::set_value(&mut doc, "assistant", "tts_command", tts_command)?;
    }

    file::write_document(&config_path, &doc)?;
    println!("\nConfig written to {}", config_path.display());

    report_applications(&existing);
    println!("\nSetup complete! Run `yuki -v` to start.");

    Ok(())
}

/// Ask for an API key, keeping the current one on blank input
fn prompt_key(label: &str, env_hint: &str, current: Option<&str>) -> anyhow::Result<Option<String>> {
    let prompt = match current {
        Some(key) => format!("{label} API key (current: {}, leave blank to keep)", mask_key(key)),
        None => format!("{label} API key ({env_hint})"),
    };

    let input: String = Input::new()
        .with_prompt(&prompt)
        .allow_empty(true)
        .interact_text()?;

    Ok(if input.trim().is_empty() {
        current.map(str::to_string)
    } else {
        Some(input.trim().to_string())
    })
}

fn report_applications(existing: &YukiConfigFile) {
    if existing.applications.is_empty() {
        println!("No applications configured yet; add one with `yuki app add <name> <path>`.");
    } else {
        println!("{} application(s) configured.", existing.applications.len());
    }
}

/// Show only the ends of a secret
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "****".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("sk-1234567890abcd"), "sk-1...abcd");
        assert_eq!(mask_key("short"), "****");
    }
}
