//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the engine and the outside world. Adapters implement these ports.
//!
//! ## Collaborator Ports
//!
//! - `IntentClassifier` - NLP intent service (black box)
//! - `CatalogLookup` - read-only catalog of requestable groups
//! - `DirectoryLookup` - manager/email identity resolution
//! - `ChatPlatform` - message and interactive prompt delivery
//! - `Provisioner` - idempotent group-membership provisioning command
//!
//! ## Store Ports
//!
//! - `ConversationRepository`, `RequestRepository`, `ApprovalTaskRepository`
//!   - durable key-value records with conditional (compare-and-swap) writes

mod catalog;
mod chat;
mod directory;
mod intent_classifier;
mod provisioner;
mod store;

pub use catalog::{CatalogEntry, CatalogLookup};
pub use chat::{ChatPlatform, PromptReceipt};
pub use directory::DirectoryLookup;
pub use intent_classifier::{Classification, Intent, IntentClassifier};
pub use provisioner::Provisioner;
pub use store::{ApprovalTaskRepository, ConversationRepository, RequestRepository};
