//! Conversation aggregate - the stateful chat session that turns free text
//! into a structured access request.

mod conversation;

pub use conversation::{Conversation, ConversationStatus, GroupCandidate, SLOT_TARGET_GROUP};
