//! Reddit modmail client over the OAuth API.
//!
//! Authenticates as a script app (password grant), caches the bearer token
//! until shortly before it expires, and talks to the new-modmail endpoints.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::RedditConfig;
use crate::error::ModMailError;
use crate::modmail::service::ModMailService;
use crate::modmail::types::{
    ConversationSnapshot, ConversationState, ConversationType, Participant, SubredditInfo,
};

const DEFAULT_API_BASE: &str = "https://oauth.reddit.com";
const DEFAULT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Refresh the token this long before Reddit says it expires.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Prefix trigger payloads put in front of the base36 conversation id.
const CONVERSATION_ID_PREFIX: &str = "ModmailConversation_";

struct CachedToken {
    access_token: SecretString,
    expires_at: Instant,
}

/// Reddit API implementation of [`ModMailService`].
pub struct RedditClient {
    config: RedditConfig,
    client: reqwest::Client,
    api_base: String,
    token_url: String,
    token: Mutex<Option<CachedToken>>,
}

impl RedditClient {
    pub fn new(config: RedditConfig) -> Result<Self, ModMailError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            config,
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            token: Mutex::new(None),
        })
    }

    /// Point the client at different API and token endpoints.
    pub fn with_endpoints(
        mut self,
        api_base: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self.token_url = token_url.into();
        self
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    /// Return a valid bearer token, fetching a new one when needed.
    async fn access_token(&self) -> Result<String, ModMailError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.access_token.expose_secret().to_string());
            }
        }

        debug!(username = %self.config.username, "Requesting Reddit access token");
        let resp = self
            .client
            .post(&self.token_url)
            .basic_auth(
                &self.config.client_id,
                Some(self.config.client_secret.expose_secret()),
            )
            .form(&[
                ("grant_type", "password"),
                ("username", self.config.username.as_str()),
                ("password", self.config.password.expose_secret()),
            ])
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let body: TokenResponse = resp.json().await?;

        // Reddit reports bad credentials as 200 with an `error` field.
        if let Some(error) = body.error {
            return Err(ModMailError::Unauthorized(format!(
                "token request rejected: {error}"
            )));
        }
        let access_token = body.access_token.ok_or_else(|| {
            ModMailError::InvalidResponse("token response without access_token".into())
        })?;

        let lifetime = Duration::from_secs(body.expires_in.unwrap_or(3600));
        *cached = Some(CachedToken {
            access_token: SecretString::from(access_token.clone()),
            expires_at: Instant::now() + lifetime.saturating_sub(TOKEN_REFRESH_MARGIN),
        });
        Ok(access_token)
    }

    /// Drop the cached token after an auth failure so the next call re-authenticates.
    async fn invalidate_token(&self) {
        self.token.lock().await.take();
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ModMailError> {
        let token = self.access_token().await?;
        let resp = request.bearer_auth(token).send().await?;
        match check_status(resp).await {
            Err(ModMailError::Unauthorized(reason)) => {
                warn!(reason = %reason, "Reddit rejected bearer token");
                self.invalidate_token().await;
                Err(ModMailError::Unauthorized(reason))
            }
            other => other,
        }
    }
}

#[async_trait]
impl ModMailService for RedditClient {
    async fn get_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<Option<ConversationSnapshot>, ModMailError> {
        let id = api_conversation_id(conversation_id);
        let request = self
            .client
            .get(self.api_url(&format!("/api/mod/conversations/{id}")))
            .query(&[("markRead", "false")]);
        let envelope: ConversationEnvelope = self.send(request).await?.json().await?;
        Ok(envelope.conversation.map(ApiConversation::into_snapshot))
    }

    async fn highlight_conversation(&self, conversation_id: &str) -> Result<(), ModMailError> {
        let id = api_conversation_id(conversation_id);
        let request = self
            .client
            .post(self.api_url(&format!("/api/mod/conversations/{id}/highlight")));
        self.send(request).await?;
        Ok(())
    }

    async fn get_current_subreddit(&self) -> Result<SubredditInfo, ModMailError> {
        let request = self
            .client
            .get(self.api_url(&format!("/r/{}/about", self.config.subreddit)));
        let about: SubredditAbout = self.send(request).await?.json().await?;
        let id = about
            .data
            .name
            .or(about.data.id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ModMailError::InvalidResponse("subreddit about without id".into()))?;
        Ok(SubredditInfo::new(subreddit_fullname(&id)))
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ModMailError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(ModMailError::Unauthorized(format!("{status}: {body}")))
        }
        _ => Err(ModMailError::Api {
            status: status.as_u16(),
            body,
        }),
    }
}

/// Strip the trigger payload prefix, leaving the base36 id the API expects.
pub fn api_conversation_id(conversation_id: &str) -> &str {
    conversation_id
        .strip_prefix(CONVERSATION_ID_PREFIX)
        .unwrap_or(conversation_id)
}

/// Normalize a subreddit id to its `t5_` fullname.
pub fn subreddit_fullname(id: &str) -> String {
    if id.starts_with("t5_") {
        id.to_string()
    } else {
        format!("t5_{id}")
    }
}

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ConversationEnvelope {
    conversation: Option<ApiConversation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiConversation {
    id: String,
    num_messages: u32,
    is_highlighted: bool,
    state: i64,
    conversation_type: Option<String>,
    is_internal: bool,
    participant: Option<ApiParticipant>,
    #[serde(alias = "subreddit")]
    participant_subreddit: Option<ApiSubreddit>,
}

/// Reddit sends `{}` rather than `null` when there is no participant.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiParticipant {
    name: Option<String>,
    is_op: bool,
    is_admin: bool,
    is_approved: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiSubreddit {
    id: Option<String>,
}

#[derive(Deserialize)]
struct SubredditAbout {
    data: SubredditAboutData,
}

#[derive(Deserialize)]
struct SubredditAboutData {
    name: Option<String>,
    id: Option<String>,
}

impl ApiConversation {
    fn into_snapshot(self) -> ConversationSnapshot {
        let participant = self.participant.and_then(|p| {
            let name = p.name.filter(|n| !n.is_empty())?;
            Some(Participant {
                name,
                is_op: p.is_op,
                is_admin: p.is_admin,
                is_approved: p.is_approved,
            })
        });

        let subreddit = self
            .participant_subreddit
            .and_then(|s| s.id)
            .filter(|id| !id.is_empty())
            .map(|id| SubredditInfo::new(subreddit_fullname(&id)));

        // Older payloads omit `conversationType`; derive it from the other fields.
        let conversation_type = match self.conversation_type.as_deref() {
            Some(raw) if !raw.is_empty() => ConversationType::parse(raw),
            _ if self.is_internal => ConversationType::Internal,
            _ if subreddit.is_some() => ConversationType::SubredditToSubreddit,
            _ => ConversationType::SubredditToUser,
        };

        ConversationSnapshot {
            id: self.id,
            num_messages: self.num_messages,
            is_highlighted: self.is_highlighted,
            state: ConversationState::from_code(self.state),
            conversation_type,
            participant,
            subreddit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(json: &str) -> ConversationSnapshot {
        let envelope: ConversationEnvelope = serde_json::from_str(json).unwrap();
        envelope.conversation.unwrap().into_snapshot()
    }

    #[test]
    fn strips_trigger_prefix() {
        assert_eq!(api_conversation_id("ModmailConversation_2abc"), "2abc");
        assert_eq!(api_conversation_id("2abc"), "2abc");
    }

    #[test]
    fn fullname_normalization() {
        assert_eq!(subreddit_fullname("2qh1i"), "t5_2qh1i");
        assert_eq!(subreddit_fullname("t5_2qh1i"), "t5_2qh1i");
    }

    #[test]
    fn decodes_user_conversation() {
        let snap = snapshot(
            r#"{"conversation": {
                "id": "2abc", "numMessages": 1, "isHighlighted": false, "state": 0,
                "conversationType": "sr_user", "isInternal": false,
                "participant": {"name": "Alice", "isOp": true, "isAdmin": false,
                                "isApproved": true, "isMod": false},
                "participantSubreddit": {}
            }, "messages": {}}"#,
        );
        assert_eq!(snap.num_messages, 1);
        assert_eq!(snap.conversation_type, ConversationType::SubredditToUser);
        let participant = snap.participant.unwrap();
        assert_eq!(participant.name, "Alice");
        assert!(participant.is_op);
        assert!(participant.is_approved);
        assert!(snap.subreddit.is_none());
    }

    #[test]
    fn empty_participant_object_is_none() {
        let snap = snapshot(
            r#"{"conversation": {"numMessages": 1, "state": 2, "conversationType": "sr_sr",
                "participant": {}, "participantSubreddit": {"id": "2qh1i", "name": "rust"}}}"#,
        );
        assert!(snap.participant.is_none());
        assert!(snap.is_archived());
        assert_eq!(snap.subreddit, Some(SubredditInfo::new("t5_2qh1i")));
    }

    #[test]
    fn infers_type_when_missing() {
        let internal = snapshot(r#"{"conversation": {"isInternal": true}}"#);
        assert_eq!(internal.conversation_type, ConversationType::Internal);

        let sr = snapshot(r#"{"conversation": {"participantSubreddit": {"id": "t5_x"}}}"#);
        assert!(sr.conversation_type.is_subreddit_to_subreddit());

        let user = snapshot(r#"{"conversation": {}}"#);
        assert_eq!(user.conversation_type, ConversationType::SubredditToUser);
    }
}
