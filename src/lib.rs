//! Yuki Gateway - wake-word gated command dispatcher for a Thai voice assistant
//!
//! This library provides the core of the Yuki assistant:
//! - Text normalization and wake phrase gating
//! - A configurable pattern table and trigger classifiers
//! - Web, application, media and weather handlers
//! - A tiered conversational fallback (Ollama, hosted API, canned replies)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              Transcribed utterance                   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                    Router                            │
//! │   Normalize  │  Wake Gate  │  Patterns  │  Triggers │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                   Handlers                           │
//! │   Web  │  Apps  │  Media  │  Weather  │  LLM chain  │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod launcher;
pub mod llm;
pub mod normalize;
pub mod router;
pub mod setup;
pub mod voice;

pub use commands::{Action, AppHandler, PatternTable, ResponseKey, ResponseTemplates};
pub use config::Config;
pub use error::{Error, Result};
pub use launcher::{Launcher, SystemLauncher};
pub use llm::{ChatBackend, ChatMessage, FallbackResponder};
pub use normalize::normalize;
pub use router::{Reply, Route, Router, SharedRouter};
pub use voice::{Speaker, WakeClass, WakeGate};
