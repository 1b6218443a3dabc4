use std::collections::VecDeque;

use super::ChatMessage;

/// Bounded conversation window
///
/// Holds at most `window` user/assistant exchanges; the oldest exchange is
/// evicted first.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    messages: VecDeque<ChatMessage>,
    window: usize,
}

impl ConversationHistory {
    /// Create an empty history keeping `window` exchanges (at least one)
    #[must_use]
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            messages: VecDeque::with_capacity(window * 2),
            window,
        }
    }

    /// Record a completed exchange, evicting the oldest beyond the window
    pub fn push_exchange(&mut self, user: &str, assistant: &str) {
        self.messages.push_back(ChatMessage::user(user));
        self.messages.push_back(ChatMessage::assistant(assistant));

        while self.messages.len() > self.window * 2 {
            self.messages.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Messages, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    /// Number of messages (two per exchange)
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Configured exchange capacity
    #[must_use]
    pub const fn window(&self) -> usize {
        self.window
    }
}
