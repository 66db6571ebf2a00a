//! SlackChat - `ChatPlatform` implementation over the Slack Web API.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::domain::foundation::{ChannelId, EngineError, TaskKey, UserId};
use crate::domain::request::Request;
use crate::ports::{ChatPlatform, PromptReceipt};

use super::client::SlackClient;

/// Action ids carried back by the interaction webhook when an approver clicks.
pub const ACTION_APPROVE: &str = "approve_request";
pub const ACTION_DENY: &str = "deny_request";

/// Chat platform adapter posting messages and interactive approval prompts.
pub struct SlackChat {
    client: Arc<SlackClient>,
}

impl SlackChat {
    pub fn new(client: Arc<SlackClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatPlatform for SlackChat {
    async fn send_message(&self, channel: &ChannelId, text: &str) -> Result<(), EngineError> {
        self.client.post_message(channel, text, None).await?;
        Ok(())
    }

    async fn send_approval_prompt(
        &self,
        approver: &UserId,
        request: &Request,
        task_key: &TaskKey,
    ) -> Result<PromptReceipt, EngineError> {
        // DMs open on the member id directly.
        let channel = ChannelId::from(approver);
        let text = format!("Approval needed: {}", request.summary());
        let blocks = approval_blocks(request, task_key);
        let message_ts = self
            .client
            .post_message(&channel, &text, Some(blocks))
            .await?;
        Ok(PromptReceipt { message_ts })
    }
}

/// Block Kit layout for an approval prompt. The task key rides in the button
/// values so the interaction webhook can address the exact task.
fn approval_blocks(request: &Request, task_key: &TaskKey) -> Value {
    json!([
        {
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!(
                    "*Access request*\n{}\nRequested by <@{}>",
                    request.summary(),
                    request.requester_id.as_str()
                )
            }
        },
        {
            "type": "actions",
            "elements": [
                {
                    "type": "button",
                    "action_id": ACTION_APPROVE,
                    "style": "primary",
                    "text": { "type": "plain_text", "text": "Approve" },
                    "value": task_key.to_string()
                },
                {
                    "type": "button",
                    "action_id": ACTION_DENY,
                    "style": "danger",
                    "text": { "type": "plain_text", "text": "Deny" },
                    "value": task_key.to_string()
                }
            ]
        }
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{EmailAddress, GroupId};
    use crate::domain::request::ApprovalType;

    fn request() -> Request {
        Request::new(
            UserId::new("U100").unwrap(),
            EmailAddress::new("dev@example.com").unwrap(),
            ChannelId::new("D100").unwrap(),
            GroupId::new("g-billing").unwrap(),
            "billing-readers",
            ApprovalType::Manual,
        )
    }

    #[test]
    fn approval_blocks_carry_task_key_in_both_buttons() {
        let task_key = TaskKey::new();
        let blocks = approval_blocks(&request(), &task_key);

        let elements = blocks[1]["elements"].as_array().unwrap();
        assert_eq!(elements.len(), 2);
        for element in elements {
            assert_eq!(element["value"], task_key.to_string());
        }
        assert_eq!(elements[0]["action_id"], ACTION_APPROVE);
        assert_eq!(elements[1]["action_id"], ACTION_DENY);
    }

    #[test]
    fn approval_blocks_mention_requester_and_group() {
        let blocks = approval_blocks(&request(), &TaskKey::new());
        let text = blocks[0]["text"]["text"].as_str().unwrap();
        assert!(text.contains("billing-readers"));
        assert!(text.contains("<@U100>"));
    }
}
