//! Application layer - command handlers orchestrating domain aggregates and
//! ports.

pub mod handlers;
