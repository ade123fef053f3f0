//! Highlight settings, the moderator-editable switches that drive evaluation.
//!
//! Settings are read fresh for every event through a [`SettingsStore`] and
//! parsed once into a [`HighlightSettings`] record before the evaluator sees them.

pub mod model;
pub mod store;

pub use model::{HighlightSettings, RawSettings};
pub use store::{EnvSettings, JsonFileSettings, SettingsStore, StaticSettings};
