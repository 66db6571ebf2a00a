//! Slack adapter - chat platform transport and user identity lookups.

mod chat;
mod client;

pub use chat::{SlackChat, ACTION_APPROVE, ACTION_DENY};
pub use client::{SlackClient, SlackConfig};
