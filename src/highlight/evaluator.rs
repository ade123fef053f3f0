//! Highlight evaluator: decides whether a new modmail conversation gets highlighted.
//!
//! Flow for each event:
//! 1. Auto-generated guard (before any fetch)
//! 2. Fetch the conversation snapshot (a missing conversation is skipped)
//! 3. Suppression guards: replies, sent mail, already highlighted, archived
//! 4. Activation rules, where every match issues its own highlight
//!
//! Fetch failures abort the evaluation. Highlight failures are logged and
//! never stop the remaining attempts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::{ModMailError, Result};
use crate::highlight::rules::{ActivationRule, SkipReason};
use crate::modmail::service::ModMailService;
use crate::modmail::types::{ConversationSnapshot, ModMailEvent};
use crate::settings::{HighlightSettings, SettingsStore};

/// One highlight call made for a matching rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightAttempt {
    pub rule: ActivationRule,
    /// Failure detail; `None` when the highlight went through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HighlightAttempt {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// How an evaluation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Skipped { reason: SkipReason },
    /// Guards passed. `attempts` is empty when no rule matched.
    Evaluated { attempts: Vec<HighlightAttempt> },
}

/// Record of one evaluation, for logging and the trigger response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub conversation_id: String,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub evaluated_at: DateTime<Utc>,
}

impl Evaluation {
    fn new(event: &ModMailEvent, outcome: Outcome) -> Self {
        Self {
            conversation_id: event.conversation_id.clone(),
            outcome,
            evaluated_at: Utc::now(),
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self.outcome {
            Outcome::Skipped { reason } => Some(reason),
            Outcome::Evaluated { .. } => None,
        }
    }

    pub fn attempts(&self) -> &[HighlightAttempt] {
        match &self.outcome {
            Outcome::Skipped { .. } => &[],
            Outcome::Evaluated { attempts } => attempts,
        }
    }
}

/// Stateless highlight decision maker. Safe to share across concurrent events.
pub struct HighlightEvaluator {
    modmail: Arc<dyn ModMailService>,
}

impl HighlightEvaluator {
    pub fn new(modmail: Arc<dyn ModMailService>) -> Self {
        Self { modmail }
    }

    /// Load settings fresh from `store`, then evaluate the event.
    pub async fn handle(
        &self,
        store: &dyn SettingsStore,
        event: &ModMailEvent,
    ) -> Result<Evaluation> {
        let settings = store.get_all().await?;
        self.evaluate(event, &settings).await
    }

    /// Run the guard chain and activation rules for one event.
    pub async fn evaluate(
        &self,
        event: &ModMailEvent,
        settings: &HighlightSettings,
    ) -> Result<Evaluation> {
        let conversation_id = event.conversation_id.as_str();

        if !settings.auto_generated && event.is_auto_generated {
            return Ok(skip(event, SkipReason::AutoGenerated));
        }

        let Some(snapshot) = self.modmail.get_conversation(conversation_id).await? else {
            return Ok(skip(event, SkipReason::Missing));
        };
        if let Some(reason) = self.suppression(settings, &snapshot).await? {
            return Ok(skip(event, reason));
        }

        let rules = ActivationRule::matching(settings, &snapshot);
        if rules.is_empty() {
            debug!(conversation_id, "No highlight rule matched");
        }

        let attempts = join_all(
            rules
                .into_iter()
                .map(|rule| self.highlight(conversation_id, rule)),
        )
        .await;

        let failed = attempts.iter().filter(|a| !a.succeeded()).count();
        if !attempts.is_empty() {
            info!(
                conversation_id,
                attempted = attempts.len(),
                failed,
                "Finished highlighting modmail"
            );
        }

        Ok(Evaluation::new(event, Outcome::Evaluated { attempts }))
    }

    /// First suppression guard that applies to the snapshot, if any.
    async fn suppression(
        &self,
        settings: &HighlightSettings,
        snapshot: &ConversationSnapshot,
    ) -> std::result::Result<Option<SkipReason>, ModMailError> {
        if snapshot.num_messages != 1 {
            debug!(
                conversation_id = %snapshot.id,
                num_messages = snapshot.num_messages,
                "Conversation already has replies"
            );
            return Ok(Some(SkipReason::Reply));
        }

        if !settings.sent {
            // A participant who didn't start the thread means the subreddit wrote first.
            if snapshot.participant.as_ref().is_some_and(|p| !p.is_op) {
                return Ok(Some(SkipReason::SentToUser));
            }
            if snapshot.conversation_type.is_subreddit_to_subreddit() {
                let current = self.modmail.get_current_subreddit().await?;
                let other = snapshot.subreddit.as_ref().map(|s| s.id.as_str());
                if other != Some(current.id.as_str()) {
                    return Ok(Some(SkipReason::SentToSubreddit));
                }
            }
        }

        if snapshot.is_highlighted {
            return Ok(Some(SkipReason::AlreadyHighlighted));
        }
        if snapshot.is_archived() {
            return Ok(Some(SkipReason::Archived));
        }
        Ok(None)
    }

    async fn highlight(&self, conversation_id: &str, rule: ActivationRule) -> HighlightAttempt {
        info!(conversation_id, rule = rule.label(), "Highlighting modmail");
        match self.modmail.highlight_conversation(conversation_id).await {
            Ok(()) => HighlightAttempt { rule, error: None },
            Err(e) => {
                error!(
                    conversation_id,
                    rule = rule.label(),
                    error = %e,
                    "Failed to highlight modmail"
                );
                HighlightAttempt {
                    rule,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

fn skip(event: &ModMailEvent, reason: SkipReason) -> Evaluation {
    info!(conversation_id = %event.conversation_id, reason = %reason, "Ignoring modmail");
    Evaluation::new(event, Outcome::Skipped { reason })
}
