//! HandleDecisionHandler - processes one approver button click.
//!
//! Safe under duplicate delivery: the first valid click wins the task's
//! conditional write, every later or concurrent click observes not-Pending
//! and becomes a no-op. Only the task's designated approver is accepted;
//! anyone else clicking the button is rejected, not silently recorded.

use std::sync::Arc;

use crate::domain::foundation::{ChannelId, EngineError, StateMachine, TaskKey, Timestamp, UserId};
use crate::domain::request::{ApprovalTask, Request, RequestStatus, TaskDecision, Verdict};
use crate::ports::{ApprovalTaskRepository, ChatPlatform, RequestRepository};

use super::DispatchProvisioningHandler;

/// Command carrying one approver button click.
#[derive(Debug, Clone)]
pub struct HandleDecisionCommand {
    /// Task the clicked button belongs to.
    pub task_key: TaskKey,
    /// User who clicked.
    pub actor_id: UserId,
    /// Approved or Denied. Pending is rejected.
    pub decision: TaskDecision,
}

/// Result of processing a button click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// This click won the task's conditional write.
    Recorded { verdict: Verdict },
    /// The task had already been decided; this click was a no-op.
    AlreadyDecided { decision: TaskDecision },
}

/// Handler for approver decisions.
pub struct HandleDecisionHandler {
    requests: Arc<dyn RequestRepository>,
    tasks: Arc<dyn ApprovalTaskRepository>,
    chat: Arc<dyn ChatPlatform>,
    provisioning: Arc<DispatchProvisioningHandler>,
}

impl HandleDecisionHandler {
    pub fn new(
        requests: Arc<dyn RequestRepository>,
        tasks: Arc<dyn ApprovalTaskRepository>,
        chat: Arc<dyn ChatPlatform>,
        provisioning: Arc<DispatchProvisioningHandler>,
    ) -> Self {
        Self {
            requests,
            tasks,
            chat,
            provisioning,
        }
    }

    pub async fn handle(&self, cmd: HandleDecisionCommand) -> Result<DecisionOutcome, EngineError> {
        if cmd.decision == TaskDecision::Pending {
            return Err(EngineError::validation(
                "a decision must be Approved or Denied",
            ));
        }

        let task = self
            .tasks
            .get(&cmd.task_key)
            .await?
            .ok_or_else(|| {
                EngineError::validation(format!("unknown approval task {}", cmd.task_key))
            })?;

        if !task.accepts_actor(&cmd.actor_id) {
            tracing::warn!(
                task_key = %cmd.task_key,
                actor = %cmd.actor_id,
                approver = %task.approver_id,
                "decision from non-approver rejected"
            );
            return Err(EngineError::validation(
                "you are not the designated approver for this request",
            ));
        }

        if !task.is_pending() {
            return Ok(DecisionOutcome::AlreadyDecided {
                decision: task.decision,
            });
        }

        // At-most-once write: of two concurrent clicks, exactly one passes
        // the Pending condition.
        let won = self
            .tasks
            .record_decision(&cmd.task_key, cmd.decision, Timestamp::now())
            .await?;
        if !won {
            let current = self
                .tasks
                .get(&cmd.task_key)
                .await?
                .map(|t| t.decision)
                .unwrap_or(cmd.decision);
            return Ok(DecisionOutcome::AlreadyDecided { decision: current });
        }

        let request = self.requests.get(&task.request_id).await?.ok_or_else(|| {
            EngineError::store(format!("request {} missing for task", task.request_id))
        })?;

        let all_tasks = self.tasks.list_for_request(&task.request_id).await?;
        let decisions: Vec<TaskDecision> = all_tasks.iter().map(|t| t.decision).collect();
        let verdict = request.approval_type.reduce(&decisions);

        tracing::info!(
            request_id = %request.id,
            task_key = %cmd.task_key,
            actor = %cmd.actor_id,
            decision = ?cmd.decision,
            verdict = ?verdict,
            "approver decision recorded"
        );

        if request.status == RequestStatus::PendingApproval {
            match verdict {
                Verdict::Approved => self.finalize_approved(&request, &cmd.actor_id).await?,
                Verdict::Denied => {
                    self.finalize_denied(&request, &cmd.actor_id, &all_tasks).await?
                }
                Verdict::Pending => {}
            }
        }

        self.acknowledge(&cmd, &request, verdict).await;
        Ok(DecisionOutcome::Recorded { verdict })
    }

    async fn finalize_approved(
        &self,
        request: &Request,
        actor_id: &UserId,
    ) -> Result<(), EngineError> {
        let mut updated = request.clone();
        updated.status = request.status.transition_to(RequestStatus::Approved)?;
        updated.decided_by = Some(actor_id.clone());

        // Exactly-once finalization: a concurrent sibling decider losing
        // this write treats its own finalization as a no-op.
        if !self
            .requests
            .update_if_status(&updated, RequestStatus::PendingApproval)
            .await?
        {
            return Ok(());
        }

        self.notify(
            &request.channel_id,
            &format!(
                "✅ Your request for *{}* was approved.",
                request.group_display_name
            ),
        )
        .await;

        if let Err(err) = self.provisioning.handle(request.id).await {
            // The request stays Approved; the provisioning command is
            // redelivered by the external at-least-once mechanism.
            tracing::warn!(error = %err, request_id = %request.id, "provisioning dispatch failed");
        }
        Ok(())
    }

    async fn finalize_denied(
        &self,
        request: &Request,
        actor_id: &UserId,
        all_tasks: &[ApprovalTask],
    ) -> Result<(), EngineError> {
        let mut updated = request.clone();
        updated.status = request.status.transition_to(RequestStatus::Denied)?;
        updated.decided_by = Some(actor_id.clone());

        if !self
            .requests
            .update_if_status(&updated, RequestStatus::PendingApproval)
            .await?
        {
            return Ok(());
        }

        self.notify(
            &request.channel_id,
            &format!(
                "❌ Your request for *{}* was denied by an approver.",
                request.group_display_name
            ),
        )
        .await;

        // Siblings still Pending are left that way for audit, but their
        // prompts are no longer load-bearing; tell the approver so.
        for sibling in all_tasks.iter().filter(|t| t.is_pending()) {
            self.notify(
                &ChannelId::from(&sibling.approver_id),
                &format!(
                    "The request \"{}\" was already denied; no action is needed from you.",
                    request.summary()
                ),
            )
            .await;
        }
        Ok(())
    }

    /// Confirms the recorded decision back to the approver who clicked.
    async fn acknowledge(&self, cmd: &HandleDecisionCommand, request: &Request, verdict: Verdict) {
        let text = match (cmd.decision, verdict) {
            (TaskDecision::Approved, Verdict::Pending) => format!(
                "✓ You approved access for {} to {}. Waiting on the other approver.",
                request.requester_email, request.group_display_name
            ),
            (TaskDecision::Approved, _) => format!(
                "✓ You approved access for {} to {}.",
                request.requester_email, request.group_display_name
            ),
            (TaskDecision::Denied, _) => format!(
                "✗ You denied access for {} to {}.",
                request.requester_email, request.group_display_name
            ),
            (TaskDecision::Pending, _) => return,
        };
        self.notify(&ChannelId::from(&cmd.actor_id), &text).await;
    }

    async fn notify(&self, channel: &ChannelId, text: &str) {
        if let Err(err) = self.chat.send_message(channel, text).await {
            tracing::warn!(error = %err, channel = %channel, "failed to send chat message");
        }
    }
}
