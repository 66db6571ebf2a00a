//! Command handlers, one per inbound event kind.
//!
//! Each handler models one stateless, short-lived invocation: it re-reads
//! persisted state, applies domain rules, persists through conditional
//! writes, and only then sends outward messages.

mod dispatch_provisioning;
mod expire_conversations;
mod handle_decision;
mod handle_turn;
mod start_approval;

pub use dispatch_provisioning::{DispatchProvisioningHandler, ProvisioningOutcome};
pub use expire_conversations::ExpireConversationsHandler;
pub use handle_decision::{DecisionOutcome, HandleDecisionCommand, HandleDecisionHandler};
pub use handle_turn::{HandleTurnCommand, HandleTurnHandler, TurnOutcome};
pub use start_approval::{StartApprovalHandler, StartApprovalOutcome};
