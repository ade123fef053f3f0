//! Process configuration, built from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default address the trigger endpoint listens on.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Default timeout for each Reddit API request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// HTTP server configuration for the trigger endpoint.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// JSON settings file re-read for every event. Env-backed settings when `None`.
    pub settings_path: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup("HIGHLIGHT_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw.parse().map_err(|e| ConfigError::InvalidValue {
            key: "HIGHLIGHT_BIND_ADDR".into(),
            message: format!("{raw:?}: {e}"),
        })?;

        let settings_path = lookup("HIGHLIGHT_SETTINGS_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            bind_addr,
            settings_path,
        })
    }
}

/// Reddit script-app credentials and target subreddit.
#[derive(Debug, Clone)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub username: String,
    pub password: SecretString,
    /// Subreddit whose modmail is being watched (without the `r/` prefix).
    pub subreddit: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl RedditConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        let client_id = required("REDDIT_CLIENT_ID")?;
        let client_secret = SecretString::from(required("REDDIT_CLIENT_SECRET")?);
        let username = required("REDDIT_USERNAME")?;
        let password = SecretString::from(required("REDDIT_PASSWORD")?);
        let subreddit = required("REDDIT_SUBREDDIT")?
            .trim()
            .trim_start_matches("/r/")
            .trim_start_matches("r/")
            .to_string();

        let user_agent = lookup("REDDIT_USER_AGENT").unwrap_or_else(|| {
            format!(
                "modmail-highlight/{} (by /u/{username})",
                env!("CARGO_PKG_VERSION")
            )
        });

        let timeout_secs = match lookup("REDDIT_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "REDDIT_TIMEOUT_SECS".into(),
                message: format!("expected whole seconds, got {raw:?}"),
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            client_id,
            client_secret,
            username,
            password,
            subreddit,
            user_agent,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
