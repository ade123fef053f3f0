//! Modmail Highlight: auto-highlights new modmail conversations.

pub mod config;
pub mod error;
pub mod highlight;
pub mod modmail;
pub mod settings;
pub mod triggers;
