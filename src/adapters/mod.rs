//! Adapters - implementations of the ports.

pub mod catalog;
pub mod gemini;
pub mod memory;
pub mod okta;
pub mod slack;
