//! Domain layer - aggregates, value objects, and lifecycle rules.

pub mod conversation;
pub mod foundation;
pub mod request;
