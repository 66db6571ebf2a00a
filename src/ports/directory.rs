//! DirectoryLookup port - identity resolution against the org directory.

use async_trait::async_trait;

use crate::domain::foundation::{EmailAddress, EngineError, UserId};

/// Port for directory/identity lookups.
///
/// All lookups are bounded synchronous calls; a timeout surfaces as a
/// transient error, an identity that genuinely does not exist as a
/// validation error.
#[async_trait]
pub trait DirectoryLookup: Send + Sync {
    /// Resolves a user's manager.
    async fn manager_of(&self, user_id: &UserId) -> Result<UserId, EngineError>;

    /// Resolves an email address to a chat platform user id.
    async fn email_to_user_id(&self, email: &EmailAddress) -> Result<UserId, EngineError>;

    /// Resolves a chat platform user id to their email address.
    async fn email_of(&self, user_id: &UserId) -> Result<EmailAddress, EngineError>;
}
