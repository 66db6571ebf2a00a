//! OktaProvisioner - `Provisioner` implementation adding users to Okta groups.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::domain::foundation::{EmailAddress, EngineError, GroupId, RequestId};
use crate::ports::Provisioner;

use super::client::{retryable, OktaClient};

/// Provisions group membership through the Okta management API.
///
/// Failure mapping: a user or group that does not exist is terminal (the
/// request can never succeed as written); rate limits and server errors are
/// transient and left to redelivery.
pub struct OktaProvisioner {
    client: Arc<OktaClient>,
}

impl OktaProvisioner {
    pub fn new(client: Arc<OktaClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Provisioner for OktaProvisioner {
    async fn provision(
        &self,
        request_id: &RequestId,
        group_id: &GroupId,
        requester_email: &EmailAddress,
    ) -> Result<(), EngineError> {
        let user = self
            .client
            .get_user(requester_email)
            .await?
            .ok_or_else(|| {
                EngineError::terminal_provisioning(
                    *request_id,
                    format!("no directory user for {}", requester_email),
                )
            })?;

        let status = self.client.add_user_to_group(group_id, &user.id).await?;
        if status.is_success() {
            info!(
                request_id = %request_id,
                group_id = %group_id,
                "group membership provisioned"
            );
            return Ok(());
        }
        if retryable(status) {
            return Err(EngineError::transient(
                "okta",
                format!("add to group returned {}", status),
            ));
        }
        Err(EngineError::terminal_provisioning(
            *request_id,
            format!("add to group {} returned {}", group_id, status),
        ))
    }
}
