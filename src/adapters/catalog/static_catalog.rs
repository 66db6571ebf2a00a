//! StaticCatalog - `CatalogLookup` over a JSON snapshot.
//!
//! The snapshot is produced by an out-of-band synchronization job; this
//! adapter only reads it. File format:
//!
//! ```json
//! {
//!   "groups": [
//!     {
//!       "group_id": "00g1ab2cd3",
//!       "display_name": "billing-readers",
//!       "description": "Read-only access to billing dashboards",
//!       "policy": { "approval_type": "MANUAL", "approver_id": "U04AB12CD" }
//!     }
//!   ]
//! }
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

use crate::domain::foundation::{EngineError, GroupId};
use crate::ports::{CatalogEntry, CatalogLookup};

#[derive(Deserialize)]
struct CatalogFile {
    groups: Vec<CatalogEntry>,
}

/// In-memory catalog loaded once at startup.
#[derive(Debug)]
pub struct StaticCatalog {
    entries: Vec<CatalogEntry>,
}

impl StaticCatalog {
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let file: CatalogFile = serde_json::from_str(json)
            .map_err(|e| EngineError::store(format!("invalid catalog file: {}", e)))?;
        Ok(Self::from_entries(file.groups))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let json = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            EngineError::store(format!(
                "failed to read catalog {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json_str(&json)
    }
}

#[async_trait]
impl CatalogLookup for StaticCatalog {
    async fn resolve(&self, fragment: &str) -> Result<Vec<CatalogEntry>, EngineError> {
        let fragment = fragment.trim().to_lowercase();
        if fragment.is_empty() {
            return Ok(Vec::new());
        }
        // Exact display-name hits beat substring hits, so "billing" resolves
        // uniquely even when "billing-admins" also exists.
        let exact: Vec<CatalogEntry> = self
            .entries
            .iter()
            .filter(|e| e.display_name.to_lowercase() == fragment)
            .cloned()
            .collect();
        if !exact.is_empty() {
            return Ok(exact);
        }
        Ok(self
            .entries
            .iter()
            .filter(|e| e.display_name.to_lowercase().contains(&fragment))
            .cloned()
            .collect())
    }

    async fn get(&self, group_id: &GroupId) -> Result<Option<CatalogEntry>, EngineError> {
        Ok(self.entries.iter().find(|e| &e.group_id == group_id).cloned())
    }

    async fn list(&self) -> Result<Vec<CatalogEntry>, EngineError> {
        Ok(self.entries.clone())
    }
}
