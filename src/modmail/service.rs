//! The modmail service seam.

use async_trait::async_trait;

use crate::error::ModMailError;
use crate::modmail::types::{ConversationSnapshot, SubredditInfo};

/// Read and mutate modmail conversations.
///
/// Implemented over the Reddit API by [`RedditClient`](crate::modmail::RedditClient);
/// tests supply in-memory fakes.
#[async_trait]
pub trait ModMailService: Send + Sync {
    /// Fetch the current state of a conversation. `None` when the service has no such conversation.
    async fn get_conversation(
        &self,
        conversation_id: &str,
    ) -> Result<Option<ConversationSnapshot>, ModMailError>;

    /// Mark a conversation as highlighted.
    async fn highlight_conversation(&self, conversation_id: &str) -> Result<(), ModMailError>;

    /// The subreddit that owns the watched modmail.
    async fn get_current_subreddit(&self) -> Result<SubredditInfo, ModMailError>;
}
