//! Catalog configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Catalog snapshot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Path to the catalog JSON snapshot.
    #[serde(default = "default_path")]
    pub path: String,
}

impl CatalogConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.path.is_empty() {
            return Err(ValidationError::MissingRequired("CATALOG__PATH"));
        }
        Ok(())
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

fn default_path() -> String {
    "catalog.json".to_string()
}
