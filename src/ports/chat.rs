//! ChatPlatform port - message and interactive prompt delivery.
//!
//! One adapter implements this port and both the conversation and approval
//! components consume it. Button clicks arrive back through the webhook
//! ingress as `(task_key, actor_id, decision)` triples; this port only
//! covers the outbound direction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChannelId, EngineError, TaskKey, UserId};
use crate::domain::request::Request;

/// Delivery receipt for an interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptReceipt {
    /// Transport timestamp/id of the delivered prompt message.
    pub message_ts: String,
}

/// Port for the chat platform transport.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Sends a plain text message to a channel or DM.
    async fn send_message(&self, channel: &ChannelId, text: &str) -> Result<(), EngineError>;

    /// Sends an interactive approve/deny prompt to an approver's DM.
    ///
    /// The task key is embedded in the button payload so the click event
    /// can be routed back to the exact ApprovalTask.
    async fn send_approval_prompt(
        &self,
        approver: &UserId,
        request: &Request,
        task_key: &TaskKey,
    ) -> Result<PromptReceipt, EngineError>;
}
