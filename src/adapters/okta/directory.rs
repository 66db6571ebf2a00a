//! OktaDirectory - `DirectoryLookup` over Okta profiles and the chat platform.
//!
//! Email <-> chat id mappings come from the chat platform's own directory;
//! the manager edge lives in the Okta profile (`managerId` holds the
//! manager's login). Resolving a manager therefore walks chat id -> email ->
//! Okta profile -> manager login -> chat id.

use async_trait::async_trait;
use std::sync::Arc;

use crate::adapters::slack::SlackClient;
use crate::domain::foundation::{EmailAddress, EngineError, UserId};
use crate::ports::DirectoryLookup;

use super::client::OktaClient;

pub struct OktaDirectory {
    okta: Arc<OktaClient>,
    chat: Arc<SlackClient>,
}

impl OktaDirectory {
    pub fn new(okta: Arc<OktaClient>, chat: Arc<SlackClient>) -> Self {
        Self { okta, chat }
    }
}

#[async_trait]
impl DirectoryLookup for OktaDirectory {
    async fn manager_of(&self, user_id: &UserId) -> Result<UserId, EngineError> {
        let email = self.email_of(user_id).await?;
        let user = self.okta.get_user(&email).await?.ok_or_else(|| {
            EngineError::validation(format!("no directory user for {}", email))
        })?;
        let manager_login = user.profile.manager_id.ok_or_else(|| {
            EngineError::validation(format!("user {} has no manager on file", user_id))
        })?;
        let manager_email = EmailAddress::new(&manager_login)?;
        self.email_to_user_id(&manager_email).await
    }

    async fn email_to_user_id(&self, email: &EmailAddress) -> Result<UserId, EngineError> {
        self.chat.user_id_by_email(email).await
    }

    async fn email_of(&self, user_id: &UserId) -> Result<EmailAddress, EngineError> {
        self.chat.user_email(user_id).await
    }
}
