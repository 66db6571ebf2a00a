//! DispatchProvisioningHandler - hand-off of an approved request to the
//! provisioning collaborator.
//!
//! Issues exactly one provisioning command per invocation. The collaborator
//! is idempotent on request id, so duplicate delivery of the dispatch is
//! harmless. No retries happen here; a transient collaborator failure
//! propagates and an external redelivery drives the next attempt.

use std::sync::Arc;

use crate::domain::foundation::{ChannelId, EngineError, RequestId, StateMachine};
use crate::domain::request::RequestStatus;
use crate::ports::{ChatPlatform, Provisioner, RequestRepository};

/// Result of one provisioning dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningOutcome {
    /// Collaborator acknowledged; request is Provisioned.
    Provisioned,
    /// Collaborator reported an unrecoverable error; request is Failed.
    Failed { reason: String },
    /// The request already reached a provisioning outcome earlier.
    AlreadySettled,
}

/// Handler dispatching approved requests to the provisioning collaborator.
pub struct DispatchProvisioningHandler {
    requests: Arc<dyn RequestRepository>,
    provisioner: Arc<dyn Provisioner>,
    chat: Arc<dyn ChatPlatform>,
    admin_channel: ChannelId,
}

impl DispatchProvisioningHandler {
    pub fn new(
        requests: Arc<dyn RequestRepository>,
        provisioner: Arc<dyn Provisioner>,
        chat: Arc<dyn ChatPlatform>,
        admin_channel: ChannelId,
    ) -> Self {
        Self {
            requests,
            provisioner,
            chat,
            admin_channel,
        }
    }

    pub async fn handle(&self, request_id: RequestId) -> Result<ProvisioningOutcome, EngineError> {
        let request = self
            .requests
            .get(&request_id)
            .await?
            .ok_or_else(|| EngineError::validation(format!("unknown request {}", request_id)))?;

        match request.status {
            RequestStatus::Approved => {}
            RequestStatus::Provisioned | RequestStatus::Failed => {
                // Duplicate delivery of the dispatch command.
                return Ok(ProvisioningOutcome::AlreadySettled);
            }
            other => {
                return Err(EngineError::validation(format!(
                    "request {} is {:?}, not Approved",
                    request_id, other
                )))
            }
        }

        let result = self
            .provisioner
            .provision(
                &request.id,
                &request.target_group_id,
                &request.requester_email,
            )
            .await;

        match result {
            Ok(()) => {
                let mut updated = request.clone();
                updated.status = request.status.transition_to(RequestStatus::Provisioned)?;
                if self
                    .requests
                    .update_if_status(&updated, RequestStatus::Approved)
                    .await?
                {
                    tracing::info!(request_id = %request.id, group = %request.target_group_id, "request provisioned");
                    self.notify(
                        &request.channel_id,
                        &format!(
                            "✅ You now have access to *{}*.",
                            request.group_display_name
                        ),
                    )
                    .await;
                }
                Ok(ProvisioningOutcome::Provisioned)
            }
            Err(EngineError::TerminalProvisioning { message, .. }) => {
                let mut updated = request.clone();
                updated.status = request.status.transition_to(RequestStatus::Failed)?;
                updated.failure_reason = Some(message.clone());
                if self
                    .requests
                    .update_if_status(&updated, RequestStatus::Approved)
                    .await?
                {
                    tracing::error!(request_id = %request.id, reason = %message, "provisioning failed terminally");
                    self.notify(
                        &request.channel_id,
                        &format!(
                            "Your approved request for *{}* could not be provisioned. \
                             An administrator has been notified.",
                            request.group_display_name
                        ),
                    )
                    .await;
                    self.notify(
                        &self.admin_channel,
                        &format!(
                            "Provisioning failed for request {} ({}): {}",
                            request.id,
                            request.summary(),
                            message
                        ),
                    )
                    .await;
                }
                Ok(ProvisioningOutcome::Failed { reason: message })
            }
            // Transient: leave the request Approved and let the external
            // redelivery mechanism drive the next attempt.
            Err(err) => Err(err),
        }
    }

    async fn notify(&self, channel: &ChannelId, text: &str) {
        if let Err(err) = self.chat.send_message(channel, text).await {
            tracing::warn!(error = %err, channel = %channel, "failed to send chat message");
        }
    }
}
