//! StartApprovalHandler - resolves a fresh request's approver set and
//! drives prompt dispatch.
//!
//! The approver set comes from the policy table row for the request's
//! approval type: the type itself was fixed at request creation, the
//! approver identities are read from the catalog at start time. Prompt
//! delivery fans out concurrently; a failure to deliver one prompt never
//! blocks the others and is reported rather than fatal.

use std::sync::Arc;

use crate::domain::foundation::{
    ChannelId, EngineError, RequestId, StateMachine, Timestamp, UserId,
};
use crate::domain::request::{
    ApprovalPolicy, ApprovalRule, ApprovalTask, ApproverSpec, Request, RequestStatus,
};
use crate::ports::{
    ApprovalTaskRepository, CatalogLookup, ChatPlatform, DirectoryLookup, RequestRepository,
};

use super::DispatchProvisioningHandler;

/// Result of starting the approval workflow for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartApprovalOutcome {
    /// Policy requires no approval; the request went straight to Approved
    /// and provisioning was dispatched. Zero tasks were created.
    AutoApproved,
    /// Interactive prompts were dispatched to the resolved approver set.
    PromptsDispatched { sent: usize, failed: usize },
    /// Duplicate delivery: the workflow was already started earlier.
    AlreadyStarted,
}

/// Handler that starts the approval workflow for a pending request.
pub struct StartApprovalHandler {
    requests: Arc<dyn RequestRepository>,
    tasks: Arc<dyn ApprovalTaskRepository>,
    catalog: Arc<dyn CatalogLookup>,
    directory: Arc<dyn DirectoryLookup>,
    chat: Arc<dyn ChatPlatform>,
    provisioning: Arc<DispatchProvisioningHandler>,
}

impl StartApprovalHandler {
    pub fn new(
        requests: Arc<dyn RequestRepository>,
        tasks: Arc<dyn ApprovalTaskRepository>,
        catalog: Arc<dyn CatalogLookup>,
        directory: Arc<dyn DirectoryLookup>,
        chat: Arc<dyn ChatPlatform>,
        provisioning: Arc<DispatchProvisioningHandler>,
    ) -> Self {
        Self {
            requests,
            tasks,
            catalog,
            directory,
            chat,
            provisioning,
        }
    }

    pub async fn handle(&self, request_id: RequestId) -> Result<StartApprovalOutcome, EngineError> {
        let request = self
            .requests
            .get(&request_id)
            .await?
            .ok_or_else(|| EngineError::validation(format!("unknown request {}", request_id)))?;

        if request.status != RequestStatus::PendingApproval {
            // A replayed start for an auto-approved request may still owe
            // its provisioning dispatch; the collaborator is idempotent.
            if request.status == RequestStatus::Approved {
                self.provisioning.handle(request_id).await?;
            }
            return Ok(StartApprovalOutcome::AlreadyStarted);
        }
        if !self.tasks.list_for_request(&request.id).await?.is_empty() {
            return Ok(StartApprovalOutcome::AlreadyStarted);
        }

        let rule = self.policy_for(&request).await?.rule()?;

        if rule == ApprovalRule::Auto {
            return self.auto_approve(request).await;
        }

        let mut tasks = Vec::with_capacity(rule.expected_task_count());
        for spec in rule.specs() {
            let approver = self.resolve_approver(&spec, &request.requester_id).await?;
            tasks.push(ApprovalTask::new(request.id, approver, spec.role()));
        }

        // Of two concurrent starts that both passed the checks above,
        // exactly one wins this conditional write; the loser created no
        // tasks and sends no prompts.
        if !self.tasks.create_all(&tasks).await? {
            return Ok(StartApprovalOutcome::AlreadyStarted);
        }

        let (sent, failed) = self.dispatch_prompts(&request, &tasks).await?;

        let notice = if sent > 0 {
            format!(
                "I've sent your request for *{}* to {} approver(s). \
                 I'll let you know when they respond.",
                request.group_display_name, sent
            )
        } else {
            "Sorry, I couldn't reach any approvers. Please contact IT directly.".to_string()
        };
        self.notify(&request.channel_id, &notice).await;

        tracing::info!(
            request_id = %request.id,
            approval_type = ?request.approval_type,
            sent,
            failed,
            "approval prompts dispatched"
        );
        Ok(StartApprovalOutcome::PromptsDispatched { sent, failed })
    }

    /// Builds the effective policy: approval type as fixed on the request,
    /// approver identities as currently configured in the catalog.
    async fn policy_for(&self, request: &Request) -> Result<ApprovalPolicy, EngineError> {
        let entry = self
            .catalog
            .get(&request.target_group_id)
            .await?
            .ok_or_else(|| {
                EngineError::validation(format!(
                    "group {} is no longer in the catalog",
                    request.target_group_id
                ))
            })?;
        Ok(ApprovalPolicy {
            approval_type: request.approval_type,
            approver_id: entry.policy.approver_id,
            approver_email: entry.policy.approver_email,
        })
    }

    async fn auto_approve(&self, request: Request) -> Result<StartApprovalOutcome, EngineError> {
        let mut updated = request.clone();
        updated.status = request.status.transition_to(RequestStatus::Approved)?;
        if self
            .requests
            .update_if_status(&updated, RequestStatus::PendingApproval)
            .await?
        {
            tracing::info!(request_id = %request.id, "request auto-approved by policy");
            self.provisioning.handle(request.id).await?;
        }
        Ok(StartApprovalOutcome::AutoApproved)
    }

    async fn resolve_approver(
        &self,
        spec: &ApproverSpec,
        requester: &UserId,
    ) -> Result<UserId, EngineError> {
        match spec {
            ApproverSpec::Manager => self.directory.manager_of(requester).await,
            ApproverSpec::Designated(id) => Ok(id.clone()),
            ApproverSpec::ByEmail(email) => self.directory.email_to_user_id(email).await,
        }
    }

    /// Fans prompts out concurrently. One slow or failing delivery does not
    /// delay the others; failures are aggregated into the outcome.
    async fn dispatch_prompts(
        &self,
        request: &Request,
        tasks: &[ApprovalTask],
    ) -> Result<(usize, usize), EngineError> {
        let sends = tasks.iter().map(|task| {
            let chat = Arc::clone(&self.chat);
            async move {
                let result = chat
                    .send_approval_prompt(&task.approver_id, request, &task.key)
                    .await;
                (task, result)
            }
        });

        let mut sent = 0;
        let mut failed = 0;
        for (task, result) in futures::future::join_all(sends).await {
            match result {
                Ok(_receipt) => {
                    self.tasks.mark_prompt_sent(&task.key, Timestamp::now()).await?;
                    sent += 1;
                }
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        task_key = %task.key,
                        approver = %task.approver_id,
                        "failed to deliver approval prompt"
                    );
                    failed += 1;
                }
            }
        }
        Ok((sent, failed))
    }

    async fn notify(&self, channel: &ChannelId, text: &str) {
        if let Err(err) = self.chat.send_message(channel, text).await {
            tracing::warn!(error = %err, channel = %channel, "failed to send chat message");
        }
    }
}
