//! Voice-facing components
//!
//! Wake phrase gating and the speech output collaborator. Audio capture and
//! transcription live outside the crate; the router consumes plain text.

mod speaker;
mod wake_word;

pub use speaker::{CommandSpeaker, LogSpeaker, Speaker};
pub use wake_word::{ACKNOWLEDGEMENTS, STOP_CALLING_REPLY, WakeClass, WakeGate};
