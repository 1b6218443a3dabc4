//! Speech output collaborator
//!
//! The router only speaks directly for the shutdown farewell; everything
//! else is returned as text for the caller to voice.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::{Error, Result};

/// Upper bound for a single synthesis command
const SPEAK_TIMEOUT: Duration = Duration::from_secs(20);

/// Speaks text aloud
#[async_trait]
pub trait Speaker: Send + Sync {
    /// Speak `text`, returning once playback has finished
    ///
    /// # Errors
    ///
    /// Returns error if synthesis or playback fails
    async fn speak(&self, text: &str) -> Result<()>;
}

/// Speaker that only logs, for headless use
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSpeaker;

#[async_trait]
impl Speaker for LogSpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        tracing::info!(text, "speak");
        Ok(())
    }
}

/// Speaker that shells out to a TTS program (e.g. `espeak -v th`, `say`)
///
/// The text is appended as the final argument.
#[derive(Debug, Clone)]
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
}

impl CommandSpeaker {
    /// Build from a whitespace-separated command line
    ///
    /// # Errors
    ///
    /// Returns error if the command line is empty
    pub fn from_command_line(command_line: &str) -> Result<Self> {
        let mut parts = command_line.split_whitespace().map(ToString::to_string);
        let program = parts
            .next()
            .ok_or_else(|| Error::Config("empty TTS command".to_string()))?;

        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

#[async_trait]
impl Speaker for CommandSpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Speech(format!("failed to spawn {}: {e}", self.program)))?;

        let output = tokio::time::timeout(SPEAK_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| Error::Speech(format!("{} timed out", self.program)))??;

        if !output.status.success() {
            return Err(Error::Speech(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_parsing() {
        let speaker = CommandSpeaker::from_command_line("espeak -v th").unwrap();
        assert_eq!(speaker.program, "espeak");
        assert_eq!(speaker.args, vec!["-v", "th"]);

        assert!(CommandSpeaker::from_command_line("   ").is_err());
    }

    #[tokio::test]
    async fn test_log_speaker() {
        assert!(LogSpeaker.speak("ยูกิกำลังปิดตัวลงค่ะ").await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_program_is_error() {
        let speaker = CommandSpeaker::from_command_line("yuki-no-such-tts-binary").unwrap();
        assert!(matches!(
            speaker.speak("hello").await,
            Err(Error::Speech(_))
        ));
    }
}
