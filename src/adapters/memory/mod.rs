//! In-memory adapter for the store ports.

mod store;

pub use store::InMemoryStore;
