//! Pattern table
//!
//! Ordered mapping from match pattern to [`Action`]. Loaded once at startup
//! from a JSON file grouped by category; the first entry whose pattern
//! matches a command wins.

use std::path::Path;

use regex::Regex;
use serde_json::{Map, Value};

use crate::Result;

/// Symbolic action attached to a pattern
///
/// Resolved from its string tag at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Speak the current time
    Time,
    /// Greeting template
    Greeting,
    /// Identity template
    Name,
    /// Current weather
    Weather,
    /// Say farewell and stop the assistant
    Shutdown,
    /// Open a configured web service by key (`open_youtube` → `youtube`)
    OpenWeb(String),
    /// Reply with a literal string
    Reply(String),
}

impl Action {
    /// Resolve an action tag
    ///
    /// Unknown tags become [`Action::Reply`] with the tag as the reply text.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "time" => Self::Time,
            "greeting" => Self::Greeting,
            "name" => Self::Name,
            "weather" => Self::Weather,
            "shutdown" => Self::Shutdown,
            _ => tag
                .strip_prefix("open_")
                .filter(|key| !key.is_empty())
                .map_or_else(|| Self::Reply(tag.to_string()), |key| Self::OpenWeb(key.to_string())),
        }
    }

    /// The tag this action was resolved from
    #[must_use]
    pub fn tag(&self) -> String {
        match self {
            Self::Time => "time".to_string(),
            Self::Greeting => "greeting".to_string(),
            Self::Name => "name".to_string(),
            Self::Weather => "weather".to_string(),
            Self::Shutdown => "shutdown".to_string(),
            Self::OpenWeb(key) => format!("open_{key}"),
            Self::Reply(text) => text.clone(),
        }
    }
}

/// A compiled pattern and its action
#[derive(Debug, Clone)]
pub struct PatternEntry {
    pattern: String,
    regex: Regex,
    action: Action,
}

impl PatternEntry {
    /// Compile a pattern
    ///
    /// Plain phrases (no regex metacharacters) match as substrings, with word
    /// boundaries when the phrase is ASCII so that "hi" does not fire inside
    /// "machine". Anything else is a case-insensitive regex; a regex that
    /// fails to compile is matched literally instead.
    ///
    /// # Errors
    ///
    /// Returns error if even the literal form exceeds regex size limits
    pub fn new(pattern: &str, action: Action) -> Result<Self> {
        let escaped = regex::escape(pattern);
        let source = if escaped == pattern {
            if pattern.is_ascii() {
                format!(r"(?i)\b{escaped}\b")
            } else {
                format!("(?i){escaped}")
            }
        } else {
            format!("(?i){pattern}")
        };

        let regex = match Regex::new(&source) {
            Ok(regex) => regex,
            Err(e) => {
                tracing::warn!(pattern, error = %e, "invalid pattern regex, matching literally");
                Regex::new(&format!("(?i){escaped}"))?
            }
        };

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            action,
        })
    }

    /// Whether this entry matches a normalized command
    #[must_use]
    pub fn matches(&self, command: &str) -> bool {
        self.regex.is_match(command)
    }

    /// Pattern source text
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Attached action
    #[must_use]
    pub const fn action(&self) -> &Action {
        &self.action
    }
}

/// Built-in table used when no pattern file is available
const DEFAULT_PATTERNS: &[(&str, &str)] = &[
    ("กี่โมงแล้ว", "time"),
    ("ตอนนี้เวลาเท่าไหร่", "time"),
    ("เวลาตอนนี้คือ", "time"),
    ("สวัสดี", "greeting"),
    ("สวัสดียูกิ", "greeting"),
    ("ยูกิสวัสดี", "greeting"),
    ("หวัดดี", "greeting"),
    ("hello", "greeting"),
    ("hi", "greeting"),
    ("ชื่ออะไร", "name"),
    ("คุณชื่ออะไร", "name"),
    ("เธอชื่ออะไร", "name"),
    ("คุณคือใคร", "name"),
    ("เธอคือใคร", "name"),
    ("อากาศวันนี้เป็นอย่างไร", "weather"),
    ("shutdown", "shutdown"),
    ("shut down", "shutdown"),
];

/// Ordered pattern table
#[derive(Debug, Clone, Default)]
pub struct PatternTable {
    entries: Vec<PatternEntry>,
}

impl PatternTable {
    /// The built-in default table
    #[must_use]
    pub fn builtin() -> Self {
        let mut table = Self::default();
        for (pattern, tag) in DEFAULT_PATTERNS {
            table.push_logged(pattern, Action::from_tag(tag));
        }
        table
    }

    /// Parse a pattern file
    ///
    /// The file is a JSON object of `category → { pattern → tag }`. A
    /// top-level string value is taken as a flat `pattern → tag` entry.
    /// Source order is preserved.
    ///
    /// # Errors
    ///
    /// Returns error if the content is not a JSON object
    pub fn from_json(content: &str) -> Result<Self> {
        let root: Map<String, Value> = serde_json::from_str(content)?;
        let mut table = Self::default();

        for (key, value) in &root {
            match value {
                Value::Object(group) => {
                    for (pattern, tag) in group {
                        table.push_raw(pattern, tag);
                    }
                }
                Value::String(_) => table.push_raw(key, value),
                _ => tracing::warn!(category = %key, "ignoring non-object pattern category"),
            }
        }

        Ok(table)
    }

    /// Load from a file, falling back to the built-in table
    ///
    /// Missing or malformed files are logged, never fatal.
    #[must_use]
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::debug!("no pattern file configured, using built-in patterns");
            return Self::builtin();
        };

        if !path.exists() {
            tracing::warn!(path = %path.display(), "pattern file not found, using built-in patterns");
            return Self::builtin();
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(crate::Error::from)
            .and_then(|content| Self::from_json(&content));

        match parsed {
            Ok(table) => {
                tracing::info!(path = %path.display(), count = table.len(), "loaded patterns");
                table
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to load pattern file, using built-in patterns"
                );
                Self::builtin()
            }
        }
    }

    fn push_raw(&mut self, pattern: &str, tag: &Value) {
        match tag.as_str() {
            Some(tag) => self.push_logged(pattern, Action::from_tag(tag)),
            None => tracing::warn!(pattern, "ignoring pattern with non-string action"),
        }
    }

    fn push_logged(&mut self, pattern: &str, action: Action) {
        if let Err(e) = self.add(pattern, action) {
            tracing::warn!(pattern, error = %e, "skipping uncompilable pattern");
        }
    }

    /// First entry matching a normalized command, in table order
    #[must_use]
    pub fn find(&self, command: &str) -> Option<&PatternEntry> {
        self.entries.iter().find(|entry| entry.matches(command))
    }

    /// Add a pattern
    ///
    /// An existing entry with the same pattern keeps its position and takes
    /// the new action; otherwise the entry is appended with lowest priority.
    ///
    /// # Errors
    ///
    /// Returns error if the pattern cannot be compiled
    pub fn add(&mut self, pattern: &str, action: Action) -> Result<()> {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.pattern == pattern) {
            existing.action = action;
        } else {
            self.entries.push(PatternEntry::new(pattern, action)?);
        }
        Ok(())
    }

    /// Remove a pattern, returning whether it was present
    pub fn remove(&mut self, pattern: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.pattern != pattern);
        self.entries.len() != before
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in priority order
    pub fn iter(&self) -> impl Iterator<Item = &PatternEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_tags() {
        assert_eq!(Action::from_tag("time"), Action::Time);
        assert_eq!(Action::from_tag("open_youtube"), Action::OpenWeb("youtube".to_string()));
        assert_eq!(Action::from_tag("open_"), Action::Reply("open_".to_string()));
        assert_eq!(Action::from_tag("ยินดีค่ะ"), Action::Reply("ยินดีค่ะ".to_string()));
        assert_eq!(Action::OpenWeb("gemini".to_string()).tag(), "open_gemini");
    }

    #[test]
    fn test_builtin_matching() {
        let table = PatternTable::builtin();

        assert_eq!(table.find("กี่โมงแล้ว").unwrap().action(), &Action::Time);
        assert_eq!(table.find("บอกหน่อยกี่โมงแล้วนะ").unwrap().action(), &Action::Time);
        assert_eq!(table.find("Hello there").unwrap().action(), &Action::Greeting);
        assert_eq!(table.find("shut down please").unwrap().action(), &Action::Shutdown);

        // ASCII literals need word boundaries
        assert!(table.find("search machine learning").is_none());
        assert!(table.find("ค้นหา python programming").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let table = PatternTable::builtin();
        // "สวัสดี" precedes "สวัสดียูกิ"; both map to greeting but the entry is the first
        assert_eq!(table.find("สวัสดียูกิ").unwrap().pattern(), "สวัสดี");
    }

    #[test]
    fn test_from_json_preserves_order() {
        let json = r#"{
            "web": { "open youtube": "open_youtube", "youtube": "greeting" },
            "time": { "กี่โมง": "time" },
            "เทส": "ทดสอบค่ะ"
        }"#;

        let table = PatternTable::from_json(json).unwrap();
        let patterns: Vec<_> = table.iter().map(PatternEntry::pattern).collect();
        assert_eq!(patterns, vec!["open youtube", "youtube", "กี่โมง", "เทส"]);

        assert_eq!(
            table.find("open youtube").unwrap().action(),
            &Action::OpenWeb("youtube".to_string())
        );
        assert_eq!(
            table.find("เทส").unwrap().action(),
            &Action::Reply("ทดสอบค่ะ".to_string())
        );
    }

    #[test]
    fn test_regex_patterns() {
        let mut table = PatternTable::default();
        table.add(r"^(what|which) time", Action::Time).unwrap();
        table.add(r"broken(", Action::Greeting).unwrap();

        assert!(table.find("What time is it").is_some());
        assert!(table.find("tell me what time").is_none());
        assert_eq!(table.find("a broken( thing").unwrap().action(), &Action::Greeting);
    }

    #[test]
    fn test_add_and_remove() {
        let mut table = PatternTable::builtin();
        let len = table.len();

        table.add("ขอบคุณ", Action::Reply("ยินดีค่ะ".to_string())).unwrap();
        assert_eq!(table.len(), len + 1);

        table.add("hello", Action::Name).unwrap();
        assert_eq!(table.len(), len + 1);
        assert_eq!(table.find("hello").unwrap().action(), &Action::Name);

        assert!(table.remove("ขอบคุณ"));
        assert!(!table.remove("ขอบคุณ"));
        assert_eq!(table.len(), len);
    }

    #[test]
    fn test_load_falls_back() {
        let dir = tempfile::tempdir().unwrap();

        let missing = PatternTable::load(Some(&dir.path().join("missing.json")));
        assert_eq!(missing.len(), DEFAULT_PATTERNS.len());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "[not an object").unwrap();
        assert_eq!(PatternTable::load(Some(&bad)).len(), DEFAULT_PATTERNS.len());

        let good = dir.path().join("commands.json");
        std::fs::write(&good, r#"{"basic": {"ping": "pong"}}"#).unwrap();
        assert_eq!(PatternTable::load(Some(&good)).len(), 1);
    }
}
