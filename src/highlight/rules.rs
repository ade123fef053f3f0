//! Suppression reasons and activation rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::modmail::types::ConversationSnapshot;
use crate::settings::HighlightSettings;

/// Why a conversation was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Auto-generated conversation while auto-generated highlighting is off.
    AutoGenerated,
    /// The modmail service returned no conversation for the id.
    Missing,
    /// More than the opening message; replies are never evaluated.
    Reply,
    /// Sent by the subreddit to a user while sent highlighting is off.
    SentToUser,
    /// Sent by the subreddit to another subreddit while sent highlighting is off.
    SentToSubreddit,
    AlreadyHighlighted,
    Archived,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::AutoGenerated => "auto-generated modmail",
            Self::Missing => "missing modmail",
            Self::Reply => "modmail reply",
            Self::SentToUser => "modmail sent to user",
            Self::SentToSubreddit => "modmail sent to subreddit",
            Self::AlreadyHighlighted => "already highlighted modmail",
            Self::Archived => "archived modmail",
        };
        f.write_str(text)
    }
}

/// A settings-gated condition that, when met, highlights the conversation.
///
/// Rules are independent: every matching rule issues its own highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationRule {
    /// `subreddits` on and the conversation is `sr_sr`.
    Subreddit,
    /// `admins` on and the participant is a Reddit admin.
    Admin,
    /// `contributors` on and the participant is an approved contributor.
    Contributor,
    /// The participant is in the configured username list.
    Username,
}

impl ActivationRule {
    /// All rules in evaluation order.
    pub const ALL: [ActivationRule; 4] = [
        ActivationRule::Subreddit,
        ActivationRule::Admin,
        ActivationRule::Contributor,
        ActivationRule::Username,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Subreddit => "sr_sr",
            Self::Admin => "admin",
            Self::Contributor => "contributor",
            Self::Username => "username",
        }
    }

    pub fn matches(&self, settings: &HighlightSettings, snapshot: &ConversationSnapshot) -> bool {
        let participant = snapshot.participant.as_ref();
        match self {
            Self::Subreddit => {
                settings.subreddits && snapshot.conversation_type.is_subreddit_to_subreddit()
            }
            Self::Admin => settings.admins && participant.is_some_and(|p| p.is_admin),
            Self::Contributor => settings.contributors && participant.is_some_and(|p| p.is_approved),
            Self::Username => {
                !settings.usernames.is_empty()
                    && participant.is_some_and(|p| settings.matches_username(&p.name))
            }
        }
    }

    /// Rules that match, in evaluation order.
    pub fn matching(settings: &HighlightSettings, snapshot: &ConversationSnapshot) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|rule| rule.matches(settings, snapshot))
            .collect()
    }
}
