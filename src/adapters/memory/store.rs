//! InMemoryStore - in-process implementation of the repository ports.
//!
//! Reference implementation of the conditional-write semantics the durable
//! key-value store must provide, and the store used by the test suites.
//! Each conditional method checks its expected-prior-state condition and
//! mutates under the same write lock, which is exactly the atomicity the
//! production store provides per key.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::conversation::Conversation;
use crate::domain::foundation::{
    ConversationId, EngineError, RequestId, TaskKey, Timestamp, UserId,
};
use crate::domain::request::{ApprovalTask, Request, RequestStatus, TaskDecision};
use crate::ports::{ApprovalTaskRepository, ConversationRepository, RequestRepository};

/// In-memory store holding all three record families.
#[derive(Default)]
pub struct InMemoryStore {
    conversations: RwLock<HashMap<ConversationId, Conversation>>,
    requests: RwLock<HashMap<RequestId, Request>>,
    tasks: RwLock<HashMap<TaskKey, ApprovalTask>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryStore {
    async fn get(&self, id: &ConversationId) -> Result<Option<Conversation>, EngineError> {
        Ok(self.conversations.read().await.get(id).cloned())
    }

    async fn find_open_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Conversation>, EngineError> {
        Ok(self
            .conversations
            .read()
            .await
            .values()
            .find(|c| c.is_open() && &c.user_id == user_id)
            .cloned())
    }

    async fn save(&self, conversation: &Conversation) -> Result<(), EngineError> {
        self.conversations
            .write()
            .await
            .insert(conversation.id, conversation.clone());
        Ok(())
    }

    async fn list_open(&self) -> Result<Vec<Conversation>, EngineError> {
        Ok(self
            .conversations
            .read()
            .await
            .values()
            .filter(|c| c.is_open())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RequestRepository for InMemoryStore {
    async fn get(&self, id: &RequestId) -> Result<Option<Request>, EngineError> {
        Ok(self.requests.read().await.get(id).cloned())
    }

    async fn create(&self, request: &Request) -> Result<(), EngineError> {
        let mut requests = self.requests.write().await;
        if requests.contains_key(&request.id) {
            return Err(EngineError::store(format!(
                "request {} already exists",
                request.id
            )));
        }
        requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn update_if_status(
        &self,
        request: &Request,
        expected: RequestStatus,
    ) -> Result<bool, EngineError> {
        let mut requests = self.requests.write().await;
        match requests.get(&request.id) {
            Some(current) if current.status == expected => {
                requests.insert(request.id, request.clone());
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(EngineError::store(format!(
                "request {} does not exist",
                request.id
            ))),
        }
    }
}

#[async_trait]
impl ApprovalTaskRepository for InMemoryStore {
    async fn get(&self, key: &TaskKey) -> Result<Option<ApprovalTask>, EngineError> {
        Ok(self.tasks.read().await.get(key).cloned())
    }

    async fn list_for_request(
        &self,
        request_id: &RequestId,
    ) -> Result<Vec<ApprovalTask>, EngineError> {
        Ok(self
            .tasks
            .read()
            .await
            .values()
            .filter(|t| &t.request_id == request_id)
            .cloned()
            .collect())
    }

    async fn create_all(&self, tasks: &[ApprovalTask]) -> Result<bool, EngineError> {
        let Some(request_id) = tasks.first().map(|t| t.request_id) else {
            return Ok(true);
        };
        let mut map = self.tasks.write().await;
        if map.values().any(|t| t.request_id == request_id) {
            return Ok(false);
        }
        for task in tasks {
            map.insert(task.key, task.clone());
        }
        Ok(true)
    }

    async fn mark_prompt_sent(&self, key: &TaskKey, at: Timestamp) -> Result<(), EngineError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(key)
            .ok_or_else(|| EngineError::store(format!("task {} does not exist", key)))?;
        task.prompt_sent_at = Some(at);
        Ok(())
    }

    async fn record_decision(
        &self,
        key: &TaskKey,
        decision: TaskDecision,
        decided_at: Timestamp,
    ) -> Result<bool, EngineError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(key)
            .ok_or_else(|| EngineError::store(format!("task {} does not exist", key)))?;
        if task.decision != TaskDecision::Pending {
            return Ok(false);
        }
        task.decision = decision;
        task.decided_at = Some(decided_at);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ChannelId, EmailAddress, GroupId};
    use crate::domain::request::{ApprovalType, ApproverRole};

    fn request() -> Request {
        Request::new(
            UserId::new("U100").unwrap(),
            EmailAddress::new("dev@example.com").unwrap(),
            ChannelId::new("D100").unwrap(),
            GroupId::new("g-billing").unwrap(),
            "billing-readers",
            ApprovalType::Manual,
        )
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = InMemoryStore::new();
        let req = request();
        RequestRepository::create(&store, &req).await.unwrap();
        let loaded = RequestRepository::get(&store, &req.id).await.unwrap();
        assert_eq!(loaded, Some(req));
    }

    #[tokio::test]
    async fn create_rejects_duplicate_request_id() {
        let store = InMemoryStore::new();
        let req = request();
        RequestRepository::create(&store, &req).await.unwrap();
        assert!(RequestRepository::create(&store, &req).await.is_err());
    }

    #[tokio::test]
    async fn update_if_status_applies_only_when_condition_holds() {
        let store = InMemoryStore::new();
        let req = request();
        RequestRepository::create(&store, &req).await.unwrap();

        let mut approved = req.clone();
        approved.status = RequestStatus::Approved;
        assert!(store
            .update_if_status(&approved, RequestStatus::PendingApproval)
            .await
            .unwrap());

        // A second writer expecting PendingApproval loses.
        let mut denied = req.clone();
        denied.status = RequestStatus::Denied;
        assert!(!store
            .update_if_status(&denied, RequestStatus::PendingApproval)
            .await
            .unwrap());

        let current = RequestRepository::get(&store, &req.id).await.unwrap().unwrap();
        assert_eq!(current.status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn create_all_writes_only_the_first_task_set() {
        let store = InMemoryStore::new();
        let request_id = RequestId::new();
        let first = vec![
            ApprovalTask::new(
                request_id,
                UserId::new("U-manager").unwrap(),
                ApproverRole::Manager,
            ),
            ApprovalTask::new(
                request_id,
                UserId::new("U-designated").unwrap(),
                ApproverRole::Designated,
            ),
        ];
        assert!(store.create_all(&first).await.unwrap());

        // A duplicate start resolves a fresh task set; the write must
        // refuse it wholesale rather than doubling the board.
        let duplicate = vec![
            ApprovalTask::new(
                request_id,
                UserId::new("U-manager").unwrap(),
                ApproverRole::Manager,
            ),
            ApprovalTask::new(
                request_id,
                UserId::new("U-designated").unwrap(),
                ApproverRole::Designated,
            ),
        ];
        assert!(!store.create_all(&duplicate).await.unwrap());

        let stored = store.list_for_request(&request_id).await.unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn record_decision_first_write_wins() {
        let store = InMemoryStore::new();
        let task = ApprovalTask::new(
            RequestId::new(),
            UserId::new("U-approver").unwrap(),
            ApproverRole::Designated,
        );
        store.create_all(std::slice::from_ref(&task)).await.unwrap();

        let now = Timestamp::now();
        assert!(store
            .record_decision(&task.key, TaskDecision::Approved, now)
            .await
            .unwrap());
        assert!(!store
            .record_decision(&task.key, TaskDecision::Denied, now)
            .await
            .unwrap());

        let stored = ApprovalTaskRepository::get(&store, &task.key)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.decision, TaskDecision::Approved);
        assert!(stored.decided_at.is_some());
    }

    #[tokio::test]
    async fn find_open_for_user_ignores_closed_conversations() {
        let store = InMemoryStore::new();
        let user = UserId::new("U100").unwrap();

        let mut done = Conversation::new(user.clone(), ChannelId::new("D100").unwrap());
        done.complete().unwrap();
        store.save(&done).await.unwrap();
        assert!(store.find_open_for_user(&user).await.unwrap().is_none());

        let open = Conversation::new(user.clone(), ChannelId::new("D100").unwrap());
        store.save(&open).await.unwrap();
        let found = store.find_open_for_user(&user).await.unwrap().unwrap();
        assert_eq!(found.id, open.id);
    }

    #[tokio::test]
    async fn list_open_excludes_terminal_conversations() {
        let store = InMemoryStore::new();
        let open = Conversation::new(
            UserId::new("U1").unwrap(),
            ChannelId::new("D1").unwrap(),
        );
        let mut abandoned = Conversation::new(
            UserId::new("U2").unwrap(),
            ChannelId::new("D2").unwrap(),
        );
        abandoned.abandon().unwrap();
        store.save(&open).await.unwrap();
        store.save(&abandoned).await.unwrap();

        let listed = store.list_open().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, open.id);
    }
}
