//! Error types for modmail-highlight.

/// Top-level error type for one highlight evaluation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Modmail error: {0}")]
    ModMail(#[from] ModMailError),
}

/// Process configuration errors (environment, bind address, credentials).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Highlight settings could not be read or parsed.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid setting {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Failures talking to the modmail service.
#[derive(Debug, thiserror::Error)]
pub enum ModMailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Modmail API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for highlight evaluation.
pub type Result<T> = std::result::Result<T, Error>;
