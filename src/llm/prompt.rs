//! Persona prompt and message assembly

use super::{ChatMessage, ConversationHistory};

/// Persona prepended to every backend call
pub const SYSTEM_PROMPT: &str = "\
You are Yuki (ยูกิ), a helpful Thai AI voice assistant. You are friendly, polite and cheerful.

Speak Thai primarily, with English where it is natural. Use respectful language (ค่ะ).

Your replies are spoken aloud:
- Keep every reply VERY SHORT: one sentence of roughly 20-30 words
- Use natural, easy-to-speak Thai
- No lists, markdown or long explanations
- If you don't know something, say so politely and never make up information";

/// Assemble the message list for one backend call
///
/// Order: persona prompt, optional `Context:` note, history oldest first,
/// then the new user turn.
#[must_use]
pub fn build_messages(
    system_prompt: &str,
    context: Option<&str>,
    history: &ConversationHistory,
    user: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 3);
    messages.push(ChatMessage::system(system_prompt));

    if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
        messages.push(ChatMessage::system(format!("Context: {context}")));
    }

    messages.extend(history.iter().cloned());
    messages.push(ChatMessage::user(user));
    messages
}
