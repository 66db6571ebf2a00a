//! ExpireConversationsHandler - the inactivity sweep.
//!
//! Driven by an external scheduled trigger. Abandoning is the only
//! cancellation path a conversation has.

use std::sync::Arc;

use crate::domain::foundation::{EngineError, Timestamp};
use crate::ports::ConversationRepository;

/// Handler that abandons conversations idle past the configured timeout.
pub struct ExpireConversationsHandler {
    conversations: Arc<dyn ConversationRepository>,
    timeout_secs: u64,
}

impl ExpireConversationsHandler {
    pub fn new(conversations: Arc<dyn ConversationRepository>, timeout_secs: u64) -> Self {
        Self {
            conversations,
            timeout_secs,
        }
    }

    /// Returns the number of conversations abandoned in this sweep.
    pub async fn handle(&self) -> Result<usize, EngineError> {
        let now = Timestamp::now();
        let mut expired = 0;

        for mut conversation in self.conversations.list_open().await? {
            if conversation.is_idle(self.timeout_secs, now) {
                conversation.abandon()?;
                self.conversations.save(&conversation).await?;
                tracing::debug!(
                    conversation_id = %conversation.id,
                    user_id = %conversation.user_id,
                    "conversation abandoned after inactivity"
                );
                expired += 1;
            }
        }

        if expired > 0 {
            tracing::info!(expired, "inactivity sweep completed");
        }
        Ok(expired)
    }
}
