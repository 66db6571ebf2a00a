//! Catalog adapter - file-backed catalog of requestable groups.

mod static_catalog;

pub use static_catalog::StaticCatalog;
