//! Command vocabulary and domain handlers
//!
//! The router consults [`patterns`] first, then the trigger-driven
//! classifiers in [`triggers`], and hands a claimed command to the matching
//! handler.

pub mod app;
pub mod media;
pub mod patterns;
pub mod responses;
pub mod triggers;
pub mod weather;
pub mod web;

pub use app::AppHandler;
pub use media::{MediaHandler, MediaKind};
pub use patterns::{Action, PatternEntry, PatternTable};
pub use responses::{ResponseKey, ResponseTemplates};
pub use triggers::{ClassifierId, TriggerHit};
pub use weather::{CurrentWeather, WeatherClient};
pub use web::WebHandler;
