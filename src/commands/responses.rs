//! Response templates
//!
//! Fixed replies keyed by name, loaded from `responses.json` over a built-in
//! set. Keys missing from the file keep their built-in text.

use std::collections::HashMap;
use std::path::Path;

use crate::Result;

/// Reply for an unknown template key
const UNKNOWN_REPLY: &str = "ขอโทษค่ะ ฉันไม่เข้าใจที่คุณพูด";

/// Template keys the router asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKey {
    Greeting,
    Name,
    UnknownCommand,
    NoCommand,
    NoQuery,
    Error,
}

impl ResponseKey {
    /// Key as it appears in `responses.json`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Name => "name",
            Self::UnknownCommand => "unknown_command",
            Self::NoCommand => "no_command",
            Self::NoQuery => "no_query",
            Self::Error => "error",
        }
    }
}

const DEFAULT_RESPONSES: &[(&str, &str)] = &[
    ("greeting", "สวัสดีค่ะ มีอะไรให้ช่วยไหมคะ?"),
    ("name", "ฉันคือผู้ช่วยอัจฉริยะของคุณค่ะ"),
    ("unknown_command", UNKNOWN_REPLY),
    ("no_command", "กรุณาพูดคำสั่งที่ต้องการค่ะ"),
    ("no_query", "กรุณาระบุสิ่งที่ต้องการค้นหาค่ะ"),
    ("error", "เกิดข้อผิดพลาดในการประมวลผลคำสั่งค่ะ"),
];

/// Named reply templates
#[derive(Debug, Clone)]
pub struct ResponseTemplates {
    templates: HashMap<String, String>,
}

impl Default for ResponseTemplates {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ResponseTemplates {
    /// The built-in templates
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            templates: DEFAULT_RESPONSES
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    /// Parse a flat `key → text` JSON object over the built-in set
    ///
    /// Non-string values are skipped.
    ///
    /// # Errors
    ///
    /// Returns error if the content is not a JSON object
    pub fn from_json(content: &str) -> Result<Self> {
        let overrides: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(content)?;
        let mut templates = Self::builtin();

        for (key, value) in overrides {
            match value.as_str() {
                Some(text) => {
                    templates.templates.insert(key, text.to_string());
                }
                None => tracing::warn!(key = %key, "ignoring non-string response template"),
            }
        }

        Ok(templates)
    }

    /// Load from a file, falling back to the built-in templates
    #[must_use]
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::builtin();
        };

        let parsed = std::fs::read_to_string(path)
            .map_err(crate::Error::from)
            .and_then(|content| Self::from_json(&content));

        match parsed {
            Ok(templates) => {
                tracing::info!(path = %path.display(), "loaded response templates");
                templates
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to load response templates, using built-in"
                );
                Self::builtin()
            }
        }
    }

    /// Template for a known key
    #[must_use]
    pub fn get(&self, key: ResponseKey) -> &str {
        self.get_named(key.as_str())
    }

    /// Template by raw name; unknown names get the "didn't understand" reply
    #[must_use]
    pub fn get_named(&self, name: &str) -> &str {
        self.templates.get(name).map_or(UNKNOWN_REPLY, String::as_str)
    }
}
