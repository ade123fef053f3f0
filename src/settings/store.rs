//! Settings sources.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::error::SettingsError;
use crate::settings::model::{HighlightSettings, RawSettings};

/// Source of highlight settings, read once per event.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get_all(&self) -> Result<HighlightSettings, SettingsError>;
}

/// Fixed settings held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSettings(pub HighlightSettings);

#[async_trait]
impl SettingsStore for StaticSettings {
    async fn get_all(&self) -> Result<HighlightSettings, SettingsError> {
        Ok(self.0.clone())
    }
}

/// JSON settings file, re-read on every call so edits apply to the next event.
///
/// The file holds a [`RawSettings`] object, e.g.
/// `{"usernames": "alice,bob", "admins": true, "sent": false}`.
#[derive(Debug, Clone)]
pub struct JsonFileSettings {
    path: PathBuf,
}

impl JsonFileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SettingsStore for JsonFileSettings {
    async fn get_all(&self) -> Result<HighlightSettings, SettingsError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SettingsError::Read {
                path: self.path.display().to_string(),
                source,
            })?;
        let parsed: RawSettings = serde_json::from_str(&raw)?;
        debug!(path = %self.path.display(), "Loaded highlight settings");
        Ok(parsed.into())
    }
}

/// Settings from `HIGHLIGHT_*` environment variables, re-read on every call.
///
/// | Variable                   | Setting          |
/// |----------------------------|------------------|
/// | `HIGHLIGHT_USERNAMES`      | `usernames`      |
/// | `HIGHLIGHT_ADMINS`         | `admins`         |
/// | `HIGHLIGHT_CONTRIBUTORS`   | `contributors`   |
/// | `HIGHLIGHT_SUBREDDITS`     | `subreddits`     |
/// | `HIGHLIGHT_AUTO_GENERATED` | `auto_generated` |
/// | `HIGHLIGHT_SENT`           | `sent`           |
pub struct EnvSettings {
    lookup: Box<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl EnvSettings {
    pub fn new() -> Self {
        Self::with_lookup(|key| std::env::var(key).ok())
    }

    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Box::new(lookup),
        }
    }

    fn flag(&self, key: &str) -> Result<Option<bool>, SettingsError> {
        let Some(raw) = (self.lookup)(key) else {
            return Ok(None);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            other => Err(SettingsError::InvalidValue {
                key: key.to_string(),
                message: format!("expected a boolean, got {other:?}"),
            }),
        }
    }
}

impl Default for EnvSettings {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettingsStore for EnvSettings {
    async fn get_all(&self) -> Result<HighlightSettings, SettingsError> {
        let raw = RawSettings {
            usernames: (self.lookup)("HIGHLIGHT_USERNAMES"),
            admins: self.flag("HIGHLIGHT_ADMINS")?,
            contributors: self.flag("HIGHLIGHT_CONTRIBUTORS")?,
            subreddits: self.flag("HIGHLIGHT_SUBREDDITS")?,
            auto_generated: self.flag("HIGHLIGHT_AUTO_GENERATED")?,
            sent: self.flag("HIGHLIGHT_SENT")?,
        };
        Ok(raw.into())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn env_settings(pairs: &[(&str, &str)]) -> EnvSettings {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvSettings::with_lookup(move |key| map.get(key).cloned())
    }

    #[tokio::test]
    async fn static_settings_round_trip() {
        let settings = HighlightSettings {
            admins: true,
            ..Default::default()
        };
        let store = StaticSettings(settings.clone());
        assert_eq!(store.get_all().await.unwrap(), settings);
    }

    #[tokio::test]
    async fn json_file_is_reread_each_call() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"admins": true}}"#).unwrap();
        let store = JsonFileSettings::new(file.path());

        let first = store.get_all().await.unwrap();
        assert!(first.admins);
        assert!(!first.contributors);

        std::fs::write(file.path(), r#"{"contributors": true, "usernames": "Alice"}"#).unwrap();
        let second = store.get_all().await.unwrap();
        assert!(!second.admins);
        assert!(second.contributors);
        assert_eq!(second.usernames, vec!["alice"]);
    }

    #[tokio::test]
    async fn json_file_missing_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSettings::new(dir.path().join("absent.json"));
        assert!(matches!(
            store.get_all().await,
            Err(SettingsError::Read { .. })
        ));
    }

    #[tokio::test]
    async fn json_file_wrong_type_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"admins": "definitely"}}"#).unwrap();
        let store = JsonFileSettings::new(file.path());
        assert!(matches!(store.get_all().await, Err(SettingsError::Parse(_))));
    }

    #[tokio::test]
    async fn env_settings_parse_flags() {
        let store = env_settings(&[
            ("HIGHLIGHT_USERNAMES", "alice,Bob"),
            ("HIGHLIGHT_ADMINS", "true"),
            ("HIGHLIGHT_CONTRIBUTORS", "0"),
            ("HIGHLIGHT_SENT", "YES"),
        ]);
        let settings = store.get_all().await.unwrap();
        assert_eq!(settings.usernames, vec!["alice", "bob"]);
        assert!(settings.admins);
        assert!(!settings.contributors);
        assert!(settings.sent);
        assert!(!settings.subreddits);
        assert!(!settings.auto_generated);
    }

    #[tokio::test]
    async fn env_settings_reject_garbage_flag() {
        let store = env_settings(&[("HIGHLIGHT_SUBREDDITS", "maybe")]);
        let err = store.get_all().await.unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { ref key, .. } if key == "HIGHLIGHT_SUBREDDITS"));
    }
}
