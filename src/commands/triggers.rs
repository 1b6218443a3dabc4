//! Classifier trigger vocabulary
//!
//! One ordered table decides which domain classifier claims a command.
//! Classifiers are tried in table order and the first trigger hit wins, even
//! when a later classifier would also match. Within a classifier, triggers
//! are listed longest first so that stripping a trigger never leaves a
//! fragment of a longer one behind.

/// Domain classifiers, in routing priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierId {
    /// Web search on a search engine
    WebSearch,
    /// Open a named website
    WebService,
    /// Launch a local application
    App,
    /// Play music or video
    Media,
}

/// Music intent triggers (media classifier)
pub const MUSIC_TRIGGERS: &[&str] = &[
    "listen to music",
    "play music",
    "open music",
    "เล่นเพลง",
    "เปิดเพลง",
    "ฟังเพลง",
];

/// Video intent triggers (media classifier)
pub const VIDEO_TRIGGERS: &[&str] = &["watch video", "open video", "เปิดวิดีโอ", "ดูวิดีโอ"];

/// Web search triggers, besides the positional "หา"
const SEARCH_TRIGGERS: &[&str] = &["search", "เสิร์ช", "ค้นหา"];

/// Bare "find" verb, only a trigger at the start or as a standalone word
const FIND_VERB: &str = "หา";

const WEB_SERVICE_TRIGGERS: &[&str] = &[
    "เปิดเว็บไซต์",
    "เข้าเว็บไซต์",
    "open website",
    "open site",
    "เปิดเว็บ",
    "เข้าเว็บ",
];

const APP_TRIGGERS: &[&str] = &[
    "open application",
    "เปิด application",
    "เปิดแอปพลิเคชัน",
    "open app",
    "เปิดแอป",
];

/// Routing order for the trigger-driven classifiers
pub const CLASSIFIER_ORDER: [ClassifierId; 4] = [
    ClassifierId::WebSearch,
    ClassifierId::WebService,
    ClassifierId::App,
    ClassifierId::Media,
];

/// A classifier claim on a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerHit {
    /// Classifier that matched
    pub classifier: ClassifierId,
    /// Trigger phrase that matched
    pub trigger: &'static str,
}

impl ClassifierId {
    /// Trigger phrases for this classifier, longest first
    #[must_use]
    pub fn triggers(self) -> Vec<&'static str> {
        match self {
            Self::WebSearch => SEARCH_TRIGGERS.to_vec(),
            Self::WebService => WEB_SERVICE_TRIGGERS.to_vec(),
            Self::App => APP_TRIGGERS.to_vec(),
            Self::Media => {
                let mut all: Vec<&'static str> =
                    MUSIC_TRIGGERS.iter().chain(VIDEO_TRIGGERS).copied().collect();
                all.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));
                all
            }
        }
    }

    /// Find this classifier's trigger in a normalized command
    #[must_use]
    pub fn find_trigger(self, command: &str) -> Option<&'static str> {
        if let Some(trigger) = self.triggers().into_iter().find(|t| contains_word(command, t)) {
            return Some(trigger);
        }

        // "หา" is too common a syllable to match anywhere (e.g. "อาหาร")
        if self == Self::WebSearch
            && (command.starts_with(FIND_VERB) || command.contains(&format!(" {FIND_VERB} ")))
        {
            return Some(FIND_VERB);
        }

        None
    }
}

/// Find the first classifier, in priority order, whose vocabulary matches
#[must_use]
pub fn classify(command: &str) -> Option<TriggerHit> {
    CLASSIFIER_ORDER.iter().find_map(|&classifier| {
        classifier
            .find_trigger(command)
            .map(|trigger| TriggerHit {
                classifier,
                trigger,
            })
    })
}

/// Remove the first occurrence of `trigger` and tidy the remainder
#[must_use]
pub fn extract_query(command: &str, trigger: &str) -> String {
    remove_word(command, trigger).unwrap_or_else(|| collapse(command))
}

/// Remove a selector such as "บน spotify" or a bare "spotify" from a query
#[must_use]
pub fn strip_selector(query: &str, name: &str) -> String {
    for connective in ["บน", "ใน", "on", "in", "at"] {
        for separator in [" ", ""] {
            if let Some(stripped) = remove_word(query, &format!("{connective}{separator}{name}")) {
                return stripped;
            }
        }
    }
    remove_word(query, name).unwrap_or_else(|| collapse(query))
}

/// Byte range of the first occurrence of `word` that is not part of a
/// longer ASCII word
///
/// An edge of `word` that is an ASCII letter or digit must not touch another
/// one, so "bing" is not found in "bingo" nor "in youtube" in "join youtube".
/// Thai edges match anywhere since Thai is written without spaces.
#[must_use]
pub fn find_word(text: &str, word: &str) -> Option<(usize, usize)> {
    let first = word.chars().next()?;
    let last = word.chars().next_back()?;

    text.match_indices(word)
        .map(|(start, _)| (start, start + word.len()))
        .find(|&(start, end)| {
            let before = text[..start].chars().next_back();
            let after = text[end..].chars().next();
            let open = !first.is_ascii_alphanumeric() || !before.is_some_and(|c| c.is_ascii_alphanumeric());
            let close = !last.is_ascii_alphanumeric() || !after.is_some_and(|c| c.is_ascii_alphanumeric());
            open && close
        })
}

/// Whether `word` occurs in `text` as a whole word
#[must_use]
pub fn contains_word(text: &str, word: &str) -> bool {
    find_word(text, word).is_some()
}

/// Remove the first whole-word occurrence of `word`, `None` if absent
fn remove_word(text: &str, word: &str) -> Option<String> {
    find_word(text, word).map(|(start, end)| collapse(&format!("{}{}", &text[..start], &text[end..])))
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
