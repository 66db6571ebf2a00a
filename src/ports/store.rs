//! Repository ports over the durable key-value store.
//!
//! All cross-invocation state lives behind these three traits. There is no
//! lock manager: mutual exclusion is expressed as conditional writes keyed
//! on expected prior state. A conditional write returns `Ok(false)` when it
//! lost the race; the losing caller re-reads current state and treats its
//! own action as a no-op, never an error.

use async_trait::async_trait;

use crate::domain::conversation::Conversation;
use crate::domain::foundation::{
    ConversationId, EngineError, RequestId, TaskKey, Timestamp, UserId,
};
use crate::domain::request::{ApprovalTask, Request, RequestStatus, TaskDecision};

/// Repository for Conversation records.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Point lookup by conversation id.
    async fn get(&self, id: &ConversationId) -> Result<Option<Conversation>, EngineError>;

    /// The user's Active/AwaitingSlot conversation, if one exists.
    ///
    /// At most one open conversation per user; callers create a new one
    /// only when this returns None.
    async fn find_open_for_user(&self, user_id: &UserId)
        -> Result<Option<Conversation>, EngineError>;

    /// Persists the conversation (insert or full replace).
    async fn save(&self, conversation: &Conversation) -> Result<(), EngineError>;

    /// All open conversations, for the inactivity sweep.
    async fn list_open(&self) -> Result<Vec<Conversation>, EngineError>;
}

/// Repository for Request records. Requests are never deleted.
#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Point lookup by request id.
    async fn get(&self, id: &RequestId) -> Result<Option<Request>, EngineError>;

    /// Inserts a new request record.
    async fn create(&self, request: &Request) -> Result<(), EngineError>;

    /// Conditionally replaces the stored request if its current status
    /// equals `expected`. Returns `Ok(false)` if the condition failed.
    ///
    /// This is the only mutation path, which is what keeps status
    /// transitions monotonic under concurrent deciders.
    async fn update_if_status(
        &self,
        request: &Request,
        expected: RequestStatus,
    ) -> Result<bool, EngineError>;
}

/// Repository for ApprovalTask records. The approval workflow engine is the
/// only writer.
#[async_trait]
pub trait ApprovalTaskRepository: Send + Sync {
    /// Point lookup by task key.
    async fn get(&self, key: &TaskKey) -> Result<Option<ApprovalTask>, EngineError>;

    /// All tasks belonging to a request. Order is not specified; consumers
    /// address tasks by key or approver.
    async fn list_for_request(&self, request_id: &RequestId)
        -> Result<Vec<ApprovalTask>, EngineError>;

    /// Inserts all tasks for a request in one atomic write, conditional on
    /// no tasks existing for that request yet. Returns `Ok(false)` without
    /// writing when another invocation already created the task set, so two
    /// concurrent workflow starts cannot both populate tasks.
    async fn create_all(&self, tasks: &[ApprovalTask]) -> Result<bool, EngineError>;

    /// Records prompt delivery time. Unconditional; delivery bookkeeping
    /// never races with decisions.
    async fn mark_prompt_sent(&self, key: &TaskKey, at: Timestamp) -> Result<(), EngineError>;

    /// Conditionally moves the task Pending -> `decision`. Returns
    /// `Ok(false)` if the task was no longer Pending, so two concurrent
    /// clicks on the same task cannot both win.
    async fn record_decision(
        &self,
        key: &TaskKey,
        decision: TaskDecision,
        decided_at: Timestamp,
    ) -> Result<bool, EngineError>;
}
