//! ApprovalTask entity - one approver's pending or decided judgment on a
//! Request.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{RequestId, TaskKey, Timestamp, UserId};

/// Which seat at the approval table this task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApproverRole {
    /// The requester's manager, resolved via directory lookup.
    Manager,
    /// A designated approver named by policy configuration.
    Designated,
}

/// An approver's decision on a task.
///
/// Written at most once: the repository's conditional write guarantees only
/// the first valid decision moves a task out of Pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskDecision {
    Pending,
    Approved,
    Denied,
}

/// ApprovalTask - the unit of approver interaction for a Request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalTask {
    /// Key embedded in the interactive prompt's button payload.
    pub key: TaskKey,

    /// Request this task belongs to.
    pub request_id: RequestId,

    /// The only user whose click on this task's buttons is accepted.
    pub approver_id: UserId,

    /// Seat this task fills in the approval rule.
    pub role: ApproverRole,

    /// Current decision state.
    pub decision: TaskDecision,

    /// When the interactive prompt was delivered, if it was.
    pub prompt_sent_at: Option<Timestamp>,

    /// When the decision was recorded.
    pub decided_at: Option<Timestamp>,
}

impl ApprovalTask {
    /// Creates a pending task for an approver.
    pub fn new(request_id: RequestId, approver_id: UserId, role: ApproverRole) -> Self {
        Self {
            key: TaskKey::new(),
            request_id,
            approver_id,
            role,
            decision: TaskDecision::Pending,
            prompt_sent_at: None,
            decided_at: None,
        }
    }

    /// Returns true while the task still accepts a decision.
    pub fn is_pending(&self) -> bool {
        self.decision == TaskDecision::Pending
    }

    /// Returns true if the given actor is this task's designated approver.
    pub fn accepts_actor(&self, actor_id: &UserId) -> bool {
        &self.approver_id == actor_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_is_pending_without_prompt_or_decision_times() {
        let task = ApprovalTask::new(
            RequestId::new(),
            UserId::new("U-approver").unwrap(),
            ApproverRole::Designated,
        );

        assert!(task.is_pending());
        assert!(task.prompt_sent_at.is_none());
        assert!(task.decided_at.is_none());
    }

    #[test]
    fn accepts_actor_only_for_designated_approver() {
        let approver = UserId::new("U-approver").unwrap();
        let task = ApprovalTask::new(RequestId::new(), approver.clone(), ApproverRole::Manager);

        assert!(task.accepts_actor(&approver));
        assert!(!task.accepts_actor(&UserId::new("U-impostor").unwrap()));
    }

    #[test]
    fn task_keys_are_unique_per_task() {
        let request_id = RequestId::new();
        let approver = UserId::new("U-approver").unwrap();
        let t1 = ApprovalTask::new(request_id, approver.clone(), ApproverRole::Manager);
        let t2 = ApprovalTask::new(request_id, approver, ApproverRole::Designated);
        assert_ne!(t1.key, t2.key);
    }
}
