//! Modmail event and conversation snapshot types.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Inbound event ───────────────────────────────────────────────────

/// Delivered once per newly created modmail conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModMailEvent {
    pub conversation_id: String,
    #[serde(default)]
    pub is_auto_generated: bool,
}

impl ModMailEvent {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            is_auto_generated: false,
        }
    }

    pub fn auto_generated(mut self) -> Self {
        self.is_auto_generated = true;
        self
    }
}

// ── Conversation snapshot ───────────────────────────────────────────

/// Conversation folder/state as reported by the modmail service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversationState {
    New,
    InProgress,
    Archived,
    Appeals,
    JoinRequests,
    Filtered,
    Unknown,
}

impl ConversationState {
    /// Map Reddit's numeric conversation state.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::New,
            1 => Self::InProgress,
            2 => Self::Archived,
            3 => Self::Appeals,
            4 => Self::JoinRequests,
            5 => Self::Filtered,
            _ => Self::Unknown,
        }
    }
}

/// Who the conversation is between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversationType {
    /// `sr_sr`: subreddit to subreddit.
    SubredditToSubreddit,
    /// `sr_user`: subreddit and a user.
    SubredditToUser,
    /// `internal`: mod discussion.
    Internal,
    Other(String),
}

impl ConversationType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "sr_sr" => Self::SubredditToSubreddit,
            "sr_user" => Self::SubredditToUser,
            "internal" => Self::Internal,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::SubredditToSubreddit => "sr_sr",
            Self::SubredditToUser => "sr_user",
            Self::Internal => "internal",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_subreddit_to_subreddit(&self) -> bool {
        matches!(self, Self::SubredditToSubreddit)
    }
}

impl fmt::Display for ConversationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The non-moderator side of a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    /// Started the conversation.
    pub is_op: bool,
    pub is_admin: bool,
    /// Approved contributor of the owning subreddit.
    pub is_approved: bool,
}

/// A subreddit as identified by its `t5_` fullname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubredditInfo {
    pub id: String,
}

impl SubredditInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Point-in-time view of a conversation, fetched once per evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSnapshot {
    pub id: String,
    pub num_messages: u32,
    pub is_highlighted: bool,
    pub state: ConversationState,
    pub conversation_type: ConversationType,
    pub participant: Option<Participant>,
    /// Subreddit on the other side of an `sr_sr` conversation.
    pub subreddit: Option<SubredditInfo>,
}

impl ConversationSnapshot {
    pub fn is_archived(&self) -> bool {
        self.state == ConversationState::Archived
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_deserializes_from_trigger_payload() {
        let event: ModMailEvent = serde_json::from_str(
            r#"{"conversationId": "ModmailConversation_2abc", "isAutoGenerated": true, "messageId": "x"}"#,
        )
        .unwrap();
        assert_eq!(event.conversation_id, "ModmailConversation_2abc");
        assert!(event.is_auto_generated);
    }

    #[test]
    fn auto_generated_defaults_to_false() {
        let event: ModMailEvent = serde_json::from_str(r#"{"conversationId": "c1"}"#).unwrap();
        assert!(!event.is_auto_generated);
    }

    #[test]
    fn conversation_type_parse() {
        assert!(ConversationType::parse("sr_sr").is_subreddit_to_subreddit());
        assert_eq!(ConversationType::parse("sr_user"), ConversationType::SubredditToUser);
        assert_eq!(
            ConversationType::parse("mystery"),
            ConversationType::Other("mystery".into())
        );
        assert_eq!(ConversationType::parse("internal").to_string(), "internal");
    }

    #[test]
    fn state_codes() {
        assert_eq!(ConversationState::from_code(2), ConversationState::Archived);
        assert_eq!(ConversationState::from_code(0), ConversationState::New);
        assert_eq!(ConversationState::from_code(42), ConversationState::Unknown);
    }
}
