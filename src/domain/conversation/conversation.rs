//! Conversation aggregate entity.
//!
//! One Conversation exists per (user, channel) interaction thread. The
//! aggregate collects intent slots across turns until the target group is
//! known, then completes by emitting a Request.
//!
//! # Invariants
//!
//! - At most one Active/AwaitingSlot conversation per user (enforced by the
//!   repository's find-active-then-create path).
//! - Terminal statuses (Completed, Abandoned) are never left.
//! - `last_event_ts` records the most recently applied inbound event so a
//!   replayed delivery is recognized and skipped.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{
    ChannelId, ConversationId, EngineError, GroupId, StateMachine, Timestamp, UserId,
};

/// Slot name for the group the user is asking access to.
pub const SLOT_TARGET_GROUP: &str = "target_group";

/// Status of a conversation in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationStatus {
    /// Accepting turns; intent not yet fully resolved.
    Active,
    /// Intent known but a required slot is missing; a choice was presented.
    AwaitingSlot,
    /// A Request was emitted. Terminal.
    Completed,
    /// Timed out from inactivity. Terminal.
    Abandoned,
}

impl StateMachine for ConversationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConversationStatus::*;
        matches!(
            (self, target),
            (Active, AwaitingSlot)
                | (Active, Completed)
                | (Active, Abandoned)
                | (AwaitingSlot, Active)
                | (AwaitingSlot, Completed)
                | (AwaitingSlot, Abandoned)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConversationStatus::*;
        match self {
            Active => vec![AwaitingSlot, Completed, Abandoned],
            AwaitingSlot => vec![Active, Completed, Abandoned],
            Completed => vec![],
            Abandoned => vec![],
        }
    }
}

/// A catalog match offered to the user when the group fragment is ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCandidate {
    /// Canonical group identifier.
    pub group_id: GroupId,
    /// Human-readable name shown in the choice prompt.
    pub display_name: String,
}

/// Conversation aggregate - one per (user, channel) thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique identifier for this conversation.
    pub id: ConversationId,

    /// User driving the conversation.
    pub user_id: UserId,

    /// Channel (usually a DM) the conversation happens in.
    pub channel_id: ChannelId,

    /// Current lifecycle status.
    pub status: ConversationStatus,

    /// Intent slots collected so far, keyed by slot name.
    pub collected_slots: HashMap<String, String>,

    /// Candidates presented while AwaitingSlot, in display order.
    pub pending_candidates: Vec<GroupCandidate>,

    /// When the last turn was applied.
    pub last_turn_at: Timestamp,

    /// Transport timestamp of the last applied inbound event.
    pub last_event_ts: Option<String>,

    /// When the conversation was created.
    pub created_at: Timestamp,
}

impl Conversation {
    /// Starts a new Active conversation.
    pub fn new(user_id: UserId, channel_id: ChannelId) -> Self {
        let now = Timestamp::now();
        Self {
            id: ConversationId::new(),
            user_id,
            channel_id,
            status: ConversationStatus::Active,
            collected_slots: HashMap::new(),
            pending_candidates: Vec::new(),
            last_turn_at: now,
            last_event_ts: None,
            created_at: now,
        }
    }

    /// Returns true while the conversation still accepts turns.
    pub fn is_open(&self) -> bool {
        matches!(
            self.status,
            ConversationStatus::Active | ConversationStatus::AwaitingSlot
        )
    }

    /// Returns true if this inbound event was already applied.
    pub fn has_seen(&self, event_ts: &str) -> bool {
        self.last_event_ts.as_deref() == Some(event_ts)
    }

    /// Marks an inbound event as applied and refreshes the activity clock.
    pub fn record_turn(&mut self, event_ts: impl Into<String>, now: Timestamp) {
        self.last_event_ts = Some(event_ts.into());
        self.last_turn_at = now;
    }

    /// Stores a collected slot value.
    pub fn fill_slot(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.collected_slots.insert(name.into(), value.into());
    }

    /// Returns a collected slot value, if present.
    pub fn slot(&self, name: &str) -> Option<&str> {
        self.collected_slots.get(name).map(String::as_str)
    }

    /// Transitions to AwaitingSlot with the candidate list to choose from.
    ///
    /// A conversation already AwaitingSlot keeps its status and has its
    /// candidate list replaced (the user asked for a different group).
    pub fn await_choice(&mut self, candidates: Vec<GroupCandidate>) -> Result<(), EngineError> {
        if self.status != ConversationStatus::AwaitingSlot {
            self.status = self.status.transition_to(ConversationStatus::AwaitingSlot)?;
        }
        self.pending_candidates = candidates;
        Ok(())
    }

    /// Returns to Active after an AwaitingSlot detour.
    pub fn resume(&mut self) -> Result<(), EngineError> {
        self.status = self.status.transition_to(ConversationStatus::Active)?;
        self.pending_candidates.clear();
        Ok(())
    }

    /// Completes the conversation. Terminal.
    pub fn complete(&mut self) -> Result<(), EngineError> {
        self.status = self.status.transition_to(ConversationStatus::Completed)?;
        self.pending_candidates.clear();
        Ok(())
    }

    /// Abandons the conversation after inactivity. Terminal.
    pub fn abandon(&mut self) -> Result<(), EngineError> {
        self.status = self.status.transition_to(ConversationStatus::Abandoned)?;
        Ok(())
    }

    /// Returns true if the conversation has been idle longer than the
    /// timeout, measured against `now`.
    pub fn is_idle(&self, timeout_secs: u64, now: Timestamp) -> bool {
        self.is_open() && self.last_turn_at.is_before(&now.minus_secs(timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation() -> Conversation {
        Conversation::new(
            UserId::new("U100").unwrap(),
            ChannelId::new("D100").unwrap(),
        )
    }

    fn candidate(id: &str, name: &str) -> GroupCandidate {
        GroupCandidate {
            group_id: GroupId::new(id).unwrap(),
            display_name: name.to_string(),
        }
    }

    #[test]
    fn new_conversation_starts_active_with_no_slots() {
        let convo = conversation();
        assert_eq!(convo.status, ConversationStatus::Active);
        assert!(convo.collected_slots.is_empty());
        assert!(convo.is_open());
    }

    #[test]
    fn has_seen_matches_only_the_last_applied_event() {
        let mut convo = conversation();
        assert!(!convo.has_seen("1700000000.000100"));

        convo.record_turn("1700000000.000100", Timestamp::now());
        assert!(convo.has_seen("1700000000.000100"));
        assert!(!convo.has_seen("1700000000.000200"));
    }

    #[test]
    fn await_choice_stores_candidates_and_transitions() {
        let mut convo = conversation();
        convo
            .await_choice(vec![candidate("g1", "billing-readers"), candidate("g2", "billing-admins")])
            .unwrap();

        assert_eq!(convo.status, ConversationStatus::AwaitingSlot);
        assert_eq!(convo.pending_candidates.len(), 2);
    }

    #[test]
    fn complete_from_awaiting_slot_clears_candidates() {
        let mut convo = conversation();
        convo.await_choice(vec![candidate("g1", "one")]).unwrap();
        convo.complete().unwrap();

        assert_eq!(convo.status, ConversationStatus::Completed);
        assert!(convo.pending_candidates.is_empty());
        assert!(!convo.is_open());
    }

    #[test]
    fn completed_conversation_rejects_further_transitions() {
        let mut convo = conversation();
        convo.complete().unwrap();

        assert!(convo.abandon().is_err());
        assert!(convo.await_choice(vec![]).is_err());
        assert!(ConversationStatus::Completed.is_terminal());
    }

    #[test]
    fn abandoned_conversation_is_terminal() {
        let mut convo = conversation();
        convo.abandon().unwrap();
        assert!(convo.complete().is_err());
        assert!(ConversationStatus::Abandoned.is_terminal());
    }

    #[test]
    fn fill_slot_and_read_back() {
        let mut convo = conversation();
        convo.fill_slot(SLOT_TARGET_GROUP, "g-billing");
        assert_eq!(convo.slot(SLOT_TARGET_GROUP), Some("g-billing"));
        assert_eq!(convo.slot("other"), None);
    }

    #[test]
    fn is_idle_respects_timeout_and_terminal_status() {
        let mut convo = conversation();
        let now = convo.last_turn_at.plus_secs(3600);

        assert!(convo.is_idle(900, now));
        assert!(!convo.is_idle(7200, now));

        convo.complete().unwrap();
        assert!(!convo.is_idle(900, now));
    }
}
