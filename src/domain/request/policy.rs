//! Approval policy - the mapping from a target group to its required
//! workflow.
//!
//! Each `ApprovalType` resolves to one `ApprovalRule` row carrying the
//! approver seats to fill and the verdict reduction over their decisions.
//! Adding a new approval type means adding one variant and one row in
//! [`ApprovalPolicy::rule`]; no handler control flow changes.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EmailAddress, EngineError, UserId};

use super::{ApproverRole, TaskDecision};

/// The approval workflow required for a target group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalType {
    /// Auto-approved; no approver interaction.
    None,
    /// One fixed designated approver from policy configuration.
    Manual,
    /// The requester's manager.
    Manager,
    /// Approver identified by a configured platform account id.
    AccountId,
    /// Approver identified by a configured email address.
    AccountEmail,
    /// Manager AND designated approver; both must approve.
    Both,
}

impl ApprovalType {
    /// Number of ApprovalTask rows this type requires.
    pub fn expected_task_count(&self) -> usize {
        match self {
            ApprovalType::None => 0,
            ApprovalType::Both => 2,
            _ => 1,
        }
    }

    /// Reduces the decisions recorded so far to a verdict.
    ///
    /// A single Denied short-circuits to Denied regardless of any sibling
    /// still Pending. Approved requires every expected task to have
    /// approved.
    pub fn reduce(&self, decisions: &[TaskDecision]) -> Verdict {
        reduce_decisions(self.expected_task_count(), decisions)
    }
}

fn reduce_decisions(expected: usize, decisions: &[TaskDecision]) -> Verdict {
    if decisions.iter().any(|d| *d == TaskDecision::Denied) {
        return Verdict::Denied;
    }
    if decisions.len() == expected && decisions.iter().all(|d| *d == TaskDecision::Approved) {
        return Verdict::Approved;
    }
    Verdict::Pending
}

/// Per-group approval configuration, as synchronized into the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalPolicy {
    /// Which workflow the group requires.
    pub approval_type: ApprovalType,

    /// Designated approver's platform account id (AccountId, and Manual or
    /// Both when configured by id).
    #[serde(default)]
    pub approver_id: Option<UserId>,

    /// Designated approver's email (AccountEmail, and Manual or Both when
    /// configured by email).
    #[serde(default)]
    pub approver_email: Option<EmailAddress>,
}

/// One approver seat, before directory resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApproverSpec {
    /// Resolve via `DirectoryLookup::manager_of(requester)`.
    Manager,
    /// A fixed platform user id.
    Designated(UserId),
    /// Resolve via `DirectoryLookup::email_to_user_id`.
    ByEmail(EmailAddress),
}

impl ApproverSpec {
    /// The role the resolved task is recorded under.
    pub fn role(&self) -> ApproverRole {
        match self {
            ApproverSpec::Manager => ApproverRole::Manager,
            ApproverSpec::Designated(_) | ApproverSpec::ByEmail(_) => ApproverRole::Designated,
        }
    }
}

/// A resolved policy row: the approver seats plus the verdict reduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalRule {
    /// No tasks; verdict is Approved immediately.
    Auto,
    /// One task; its decision is the verdict.
    Single(ApproverSpec),
    /// Two tasks; Approved iff both approve, Denied as soon as either
    /// denies.
    Dual {
        manager: ApproverSpec,
        designated: ApproverSpec,
    },
}

impl ApprovalRule {
    /// The approver seats this rule requires, in task-creation order.
    pub fn specs(&self) -> Vec<ApproverSpec> {
        match self {
            ApprovalRule::Auto => vec![],
            ApprovalRule::Single(spec) => vec![spec.clone()],
            ApprovalRule::Dual {
                manager,
                designated,
            } => vec![manager.clone(), designated.clone()],
        }
    }

    /// Number of ApprovalTask rows this rule creates.
    pub fn expected_task_count(&self) -> usize {
        match self {
            ApprovalRule::Auto => 0,
            ApprovalRule::Single(_) => 1,
            ApprovalRule::Dual { .. } => 2,
        }
    }

    /// Reduces the decisions recorded so far to a verdict. See
    /// [`ApprovalType::reduce`].
    pub fn reduce(&self, decisions: &[TaskDecision]) -> Verdict {
        reduce_decisions(self.expected_task_count(), decisions)
    }
}

/// The reduced outcome of all ApprovalTasks for a Request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pending,
    Approved,
    Denied,
}

impl ApprovalPolicy {
    /// Convenience constructor for groups that need no approval.
    pub fn auto() -> Self {
        Self {
            approval_type: ApprovalType::None,
            approver_id: None,
            approver_email: None,
        }
    }

    /// Resolves this policy to its rule row.
    ///
    /// Fails with a validation error when the configuration is missing the
    /// identity the approval type requires.
    pub fn rule(&self) -> Result<ApprovalRule, EngineError> {
        match self.approval_type {
            ApprovalType::None => Ok(ApprovalRule::Auto),
            ApprovalType::Manual => Ok(ApprovalRule::Single(self.designated_spec()?)),
            ApprovalType::Manager => Ok(ApprovalRule::Single(ApproverSpec::Manager)),
            ApprovalType::AccountId => {
                let id = self.approver_id.clone().ok_or_else(|| {
                    EngineError::validation("ACCOUNT_ID policy is missing approver_id")
                })?;
                Ok(ApprovalRule::Single(ApproverSpec::Designated(id)))
            }
            ApprovalType::AccountEmail => {
                let email = self.approver_email.clone().ok_or_else(|| {
                    EngineError::validation("ACCOUNT_EMAIL policy is missing approver_email")
                })?;
                Ok(ApprovalRule::Single(ApproverSpec::ByEmail(email)))
            }
            ApprovalType::Both => Ok(ApprovalRule::Dual {
                manager: ApproverSpec::Manager,
                designated: self.designated_spec()?,
            }),
        }
    }

    /// Human-readable approval requirement for catalog help replies.
    pub fn describe_requirement(&self) -> &'static str {
        match self.approval_type {
            ApprovalType::None => "Auto-approved.",
            ApprovalType::Manual => "One designated approver.",
            ApprovalType::Manager => "Manager approval.",
            ApprovalType::AccountId => "One designated approver.",
            ApprovalType::AccountEmail => "One designated approver.",
            ApprovalType::Both => "Manager AND designated approver.",
        }
    }

    fn designated_spec(&self) -> Result<ApproverSpec, EngineError> {
        if let Some(id) = &self.approver_id {
            return Ok(ApproverSpec::Designated(id.clone()));
        }
        if let Some(email) = &self.approver_email {
            return Ok(ApproverSpec::ByEmail(email.clone()));
        }
        Err(EngineError::validation(format!(
            "{:?} policy is missing both approver_id and approver_email",
            self.approval_type
        )))
    }
}
