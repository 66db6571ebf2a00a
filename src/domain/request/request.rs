//! Request aggregate entity.
//!
//! One Request exists per resolved access ask. Requests are audit records:
//! they are never deleted, and their status only moves forward.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    ChannelId, EmailAddress, EngineError, GroupId, RequestId, StateMachine, Timestamp, UserId,
};

use super::ApprovalType;

/// Status of a request in its lifecycle.
///
/// Transitions are monotonic: Approved, Denied, Provisioned, and Failed are
/// never left once reached (Approved only advances toward a provisioning
/// outcome).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    /// Awaiting approver decisions.
    PendingApproval,
    /// Verdict reached: approved. Provisioning hand-off pending.
    Approved,
    /// Verdict reached: denied. Terminal.
    Denied,
    /// Provisioning collaborator acknowledged the command. Terminal.
    Provisioned,
    /// Provisioning collaborator reported an unrecoverable error. Terminal.
    Failed,
}

impl StateMachine for RequestStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use RequestStatus::*;
        matches!(
            (self, target),
            (PendingApproval, Approved)
                | (PendingApproval, Denied)
                | (Approved, Provisioned)
                | (Approved, Failed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use RequestStatus::*;
        match self {
            PendingApproval => vec![Approved, Denied],
            Approved => vec![Provisioned, Failed],
            Denied => vec![],
            Provisioned => vec![],
            Failed => vec![],
        }
    }
}

/// Request aggregate - a single resolved ask for access to one target group
/// by one requester.
///
/// # Invariants
///
/// - `approval_type` is resolved once, from policy, at creation time.
/// - Status transitions go through the repository's conditional writes so
///   concurrent deciders cannot both win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Unique identifier for this request.
    pub id: RequestId,

    /// User asking for access.
    pub requester_id: UserId,

    /// Requester's email, shown in approver-facing summaries.
    pub requester_email: EmailAddress,

    /// Channel to deliver status notices to (usually the requester's DM).
    pub channel_id: ChannelId,

    /// Canonical identifier of the group being requested.
    pub target_group_id: GroupId,

    /// Human-readable group name for prompts and notices.
    pub group_display_name: String,

    /// Approval workflow this request must go through. Fixed at creation.
    pub approval_type: ApprovalType,

    /// Current lifecycle status.
    pub status: RequestStatus,

    /// Approver whose decision produced the final verdict, if any.
    pub decided_by: Option<UserId>,

    /// Error retained when the provisioning collaborator reports an
    /// unrecoverable failure.
    pub failure_reason: Option<String>,

    /// When the request was created.
    pub created_at: Timestamp,
}

impl Request {
    /// Creates a request in PendingApproval with its policy-resolved
    /// approval type.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        requester_id: UserId,
        requester_email: EmailAddress,
        channel_id: ChannelId,
        target_group_id: GroupId,
        group_display_name: impl Into<String>,
        approval_type: ApprovalType,
    ) -> Self {
        Self {
            id: RequestId::new(),
            requester_id,
            requester_email,
            channel_id,
            target_group_id,
            group_display_name: group_display_name.into(),
            approval_type,
            status: RequestStatus::PendingApproval,
            decided_by: None,
            failure_reason: None,
            created_at: Timestamp::now(),
        }
    }

    /// Returns true once the request has reached a state it can never leave.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// One-line summary used in approver prompts and log events.
    pub fn summary(&self) -> String {
        format!(
            "{} requests access to {}",
            self.requester_email, self.group_display_name
        )
    }
}
