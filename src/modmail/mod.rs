//! Modmail types and the service used to read and highlight conversations.

pub mod reddit;
pub mod service;
pub mod types;

pub use reddit::RedditClient;
pub use service::ModMailService;
pub use types::*;
