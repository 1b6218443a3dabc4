//! Wake word gating
//!
//! Decides whether a normalized utterance is addressed to the assistant.
//! Speech not prefixed by a wake phrase is ignored, a bare wake phrase is
//! acknowledged, and anything after a wake phrase is handed to the router.

use crate::normalize::normalize;

/// Replies for consecutive bare wake calls, in order
pub const ACKNOWLEDGEMENTS: [&str; 5] = [
    "ค่ะ ยูกิอยู่นี่ค่ะ",
    "เรียกใช้ยูกิได้เลยค่ะ",
    "ยูกิพร้อมช่วยเหลือค่ะ",
    "นี่!! ตั้งใจแกล้งกันรึป่าวคะ?",
    "แบบนี้แกล้งกันชัด ๆ เลย!!!",
];

/// Reply once every acknowledgement has been used
pub const STOP_CALLING_REPLY: &str =
    "ถ้าไม่อยากคุยกับยูกิแล้วให้พูดว่า 'ยูกิ shutdown' นะคะ มาเรียกแล้วไม่พูดแบบนี้ยูกิก็เสียใจ";

/// Classification of an utterance against the configured wake phrases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeClass {
    /// Utterance is exactly a wake phrase
    BareWake,
    /// Utterance starts with a wake phrase followed by more content
    PrefixedCommand,
    /// Utterance is not addressed to the assistant
    Unrelated,
}

/// Wake phrase gate with the bare-call counter
#[derive(Debug)]
pub struct WakeGate {
    /// Lowercased phrases, longest first
    wake_words: Vec<String>,
    call_count: u32,
}

impl WakeGate {
    /// Create a gate from a primary phrase and alternates
    ///
    /// Phrases are normalized like utterances; empty and duplicate phrases
    /// are dropped.
    #[must_use]
    pub fn new(primary: &str, alternates: &[String]) -> Self {
        let mut wake_words: Vec<String> = Vec::new();
        for phrase in std::iter::once(primary).chain(alternates.iter().map(String::as_str)) {
            let normalized = normalize(phrase);
            if !normalized.is_empty() && !wake_words.contains(&normalized) {
                wake_words.push(normalized);
            }
        }

        // Longest first so "yuki chan" is stripped before "yuki"
        wake_words.sort_by_key(|w| std::cmp::Reverse(w.chars().count()));

        tracing::debug!(wake_words = ?wake_words, "wake gate initialized");

        Self {
            wake_words,
            call_count: 0,
        }
    }

    /// Classify an utterance
    #[must_use]
    pub fn classify(&self, text: &str) -> WakeClass {
        let trimmed = text.trim();
        let lowered = trimmed.to_lowercase();

        if self.wake_words.iter().any(|w| *w == lowered) {
            return WakeClass::BareWake;
        }

        let prefixed = self.wake_words.iter().any(|w| {
            strip_prefix_ci(trimmed, w).is_some_and(|rest| !rest.trim().is_empty())
        });

        if prefixed {
            WakeClass::PrefixedCommand
        } else {
            WakeClass::Unrelated
        }
    }

    /// Remove the leading wake phrase and separators from an utterance
    ///
    /// Returns the text unchanged when no wake phrase matches.
    #[must_use]
    pub fn strip_wake_prefix(&self, text: &str) -> String {
        let trimmed = text.trim_start();

        for wake_word in &self.wake_words {
            if let Some(rest) = strip_prefix_ci(trimmed, wake_word) {
                return rest
                    .trim_start_matches(|c: char| c == ',' || c == ':' || c.is_whitespace())
                    .trim()
                    .to_string();
            }
        }

        text.to_string()
    }

    /// Register a bare wake call and return its acknowledgement
    ///
    /// The counter saturates: after [`ACKNOWLEDGEMENTS`] is exhausted every
    /// further call gets [`STOP_CALLING_REPLY`] until [`Self::reset_calls`].
    pub fn acknowledge(&mut self) -> &'static str {
        self.call_count = self.call_count.saturating_add(1);

        let reply = usize::try_from(self.call_count - 1)
            .ok()
            .and_then(|idx| ACKNOWLEDGEMENTS.get(idx))
            .copied()
            .unwrap_or(STOP_CALLING_REPLY);

        tracing::debug!(call_count = self.call_count, "bare wake call");
        reply
    }

    /// Number of bare wake calls since start or last reset
    #[must_use]
    pub const fn call_count(&self) -> u32 {
        self.call_count
    }

    /// Reset the bare-call counter
    pub const fn reset_calls(&mut self) {
        self.call_count = 0;
    }

    /// Configured wake phrases, longest first
    #[must_use]
    pub fn wake_words(&self) -> &[String] {
        &self.wake_words
    }
}

/// Case-insensitive `strip_prefix` against an already-lowercased prefix
fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let mut expected = prefix.chars().peekable();

    for (idx, c) in text.char_indices() {
        if expected.peek().is_none() {
            return Some(&text[idx..]);
        }
        for lower in c.to_lowercase() {
            if expected.next() != Some(lower) {
                return None;
            }
        }
    }

    expected.peek().is_none().then_some("")
}
