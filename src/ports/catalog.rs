//! CatalogLookup port - read-only resolver over the synchronized catalog of
//! requestable groups.
//!
//! The catalog is refreshed out-of-band by a separate synchronization job
//! and may be stale up to that job's interval. Each entry carries the
//! group's approval policy, which is how a target group maps to its
//! required workflow.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EngineError, GroupId};
use crate::domain::request::ApprovalPolicy;

/// One requestable group in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Canonical group identifier in the identity provider.
    pub group_id: GroupId,
    /// Human-readable name users type and see.
    pub display_name: String,
    /// Optional description shown in prompts and help replies.
    #[serde(default)]
    pub description: Option<String>,
    /// Approval workflow required for this group.
    pub policy: ApprovalPolicy,
}

/// Port for resolving human-typed group fragments to catalog entries.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Returns all entries whose display name matches the fragment.
    async fn resolve(&self, fragment: &str) -> Result<Vec<CatalogEntry>, EngineError>;

    /// Point lookup by canonical group id.
    async fn get(&self, group_id: &GroupId) -> Result<Option<CatalogEntry>, EngineError>;

    /// All requestable entries, for catalog help replies.
    async fn list(&self) -> Result<Vec<CatalogEntry>, EngineError>;
}
