//! Provisioner port - the idempotent provisioning command.

use async_trait::async_trait;

use crate::domain::foundation::{EmailAddress, EngineError, GroupId, RequestId};

/// Port for the provisioning collaborator.
///
/// The receiving side must tolerate duplicate delivery keyed on
/// `request_id`. Implementations distinguish transient faults
/// (`EngineError::Transient`, safe to redeliver) from terminal rejection
/// (`EngineError::TerminalProvisioning`, moves the request to Failed).
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Adds the requester to the target group.
    async fn provision(
        &self,
        request_id: &RequestId,
        target_group_id: &GroupId,
        requester_email: &EmailAddress,
    ) -> Result<(), EngineError>;
}
