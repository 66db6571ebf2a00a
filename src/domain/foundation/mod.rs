//! Foundation value objects shared across the domain.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::EngineError;
pub use ids::{ChannelId, ConversationId, EmailAddress, GroupId, RequestId, TaskKey, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
