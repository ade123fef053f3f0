//! Typed highlight settings.

use serde::{Deserialize, Serialize};

/// Settings as stored: loosely filled, every key optional.
///
/// Keys mirror the installation settings form (`autoGenerated`, `sent`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSettings {
    /// Comma-separated usernames.
    pub usernames: Option<String>,
    pub admins: Option<bool>,
    pub contributors: Option<bool>,
    pub subreddits: Option<bool>,
    pub auto_generated: Option<bool>,
    pub sent: Option<bool>,
}

/// Validated settings for one evaluation.
///
/// Unset switches are off. Usernames are stored lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightSettings {
    /// Lowercased usernames whose new conversations get highlighted.
    pub usernames: Vec<String>,
    /// Highlight conversations whose participant is a Reddit admin.
    pub admins: bool,
    /// Highlight conversations whose participant is an approved contributor.
    pub contributors: bool,
    /// Highlight subreddit-to-subreddit conversations.
    pub subreddits: bool,
    /// Evaluate auto-generated conversations at all.
    pub auto_generated: bool,
    /// Evaluate conversations the subreddit itself sent out.
    pub sent: bool,
}

impl HighlightSettings {
    /// Replace the username list from a comma-separated string.
    pub fn with_usernames(mut self, list: &str) -> Self {
        self.usernames = parse_usernames(list);
        self
    }

    /// Case-insensitive membership check against the configured usernames.
    pub fn matches_username(&self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        !name.is_empty() && self.usernames.contains(&name)
    }
}

impl From<RawSettings> for HighlightSettings {
    fn from(raw: RawSettings) -> Self {
        Self {
            usernames: parse_usernames(raw.usernames.as_deref().unwrap_or_default()),
            admins: raw.admins.unwrap_or(false),
            contributors: raw.contributors.unwrap_or(false),
            subreddits: raw.subreddits.unwrap_or(false),
            auto_generated: raw.auto_generated.unwrap_or(false),
            sent: raw.sent.unwrap_or(false),
        }
    }
}

/// Split a comma-separated username list.
///
/// Entries are trimmed, lowercased, stripped of a leading `u/`, and empty
/// entries are dropped.
pub fn parse_usernames(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| {
            let s = s.trim();
            let s = s
                .strip_prefix("/u/")
                .or_else(|| s.strip_prefix("u/"))
                .unwrap_or(s);
            s.to_lowercase()
        })
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_raw_settings_are_all_off() {
        let settings = HighlightSettings::from(RawSettings::default());
        assert_eq!(settings, HighlightSettings::default());
        assert!(settings.usernames.is_empty());
    }

    #[test]
    fn parses_camel_case_keys() {
        let raw: RawSettings = serde_json::from_str(
            r#"{"usernames": "Alice, bob", "admins": true, "autoGenerated": true, "sent": false}"#,
        )
        .unwrap();
        let settings = HighlightSettings::from(raw);
        assert_eq!(settings.usernames, vec!["alice", "bob"]);
        assert!(settings.admins);
        assert!(settings.auto_generated);
        assert!(!settings.sent);
        assert!(!settings.contributors);
    }

    #[test]
    fn username_list_drops_blanks_and_prefixes() {
        assert_eq!(
            parse_usernames(" u/Alice,,/u/BOB , carol,"),
            vec!["alice", "bob", "carol"]
        );
        assert!(parse_usernames("").is_empty());
        assert!(parse_usernames(" , ").is_empty());
    }

    #[test]
    fn username_match_is_case_insensitive() {
        let settings = HighlightSettings::default().with_usernames("alice,bob");
        assert!(settings.matches_username("Alice"));
        assert!(settings.matches_username("BOB"));
        assert!(!settings.matches_username("carol"));
        assert!(!settings.matches_username(""));
    }

    #[test]
    fn empty_list_matches_nobody() {
        let settings = HighlightSettings::default();
        assert!(!settings.matches_username("alice"));
    }
}
