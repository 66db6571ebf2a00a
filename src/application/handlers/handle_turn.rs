//! HandleTurnHandler - the conversation state machine.
//!
//! Resolves one inbound chat turn into either a clarifying question, a
//! pending group choice, or a completed Request ready for the approval
//! workflow. All conversation mutations are persisted before any outward
//! message is sent, so a replayed delivery re-reads the already-advanced
//! state instead of re-triggering it.

use std::sync::Arc;

use crate::domain::conversation::{
    Conversation, ConversationStatus, GroupCandidate, SLOT_TARGET_GROUP,
};
use crate::domain::foundation::{ChannelId, EngineError, Timestamp, UserId};
use crate::domain::request::Request;
use crate::ports::{
    CatalogEntry, CatalogLookup, ChatPlatform, Classification, ConversationRepository,
    DirectoryLookup, Intent, IntentClassifier, RequestRepository,
};

const MSG_TRY_AGAIN: &str =
    "Sorry, I'm having trouble processing your request right now. Please try again.";
const MSG_WHICH_GROUP: &str = "Which group would you like access to?";
const MSG_NOT_UNDERSTOOD: &str =
    "I didn't quite catch that. You can ask me for access to a group, \
     or ask what you can request.";

/// Command carrying one inbound chat turn.
#[derive(Debug, Clone)]
pub struct HandleTurnCommand {
    /// User who sent the message.
    pub user_id: UserId,
    /// Channel the message arrived in.
    pub channel_id: ChannelId,
    /// Raw message text.
    pub text: String,
    /// Transport timestamp of the event, used for replay detection.
    pub event_ts: String,
}

/// Result of processing one turn.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// Duplicate delivery of an already-applied event; nothing changed.
    Replayed,
    /// The engine replied with a question or help text; conversation open.
    Clarification,
    /// Multiple catalog matches were offered; conversation AwaitingSlot.
    AwaitingChoice,
    /// All slots resolved; the Request was created and the conversation
    /// completed. The caller hands the request to the approval workflow.
    Completed(Request),
}

/// Handler for inbound chat turns.
pub struct HandleTurnHandler {
    conversations: Arc<dyn ConversationRepository>,
    requests: Arc<dyn RequestRepository>,
    classifier: Arc<dyn IntentClassifier>,
    catalog: Arc<dyn CatalogLookup>,
    directory: Arc<dyn DirectoryLookup>,
    chat: Arc<dyn ChatPlatform>,
    confidence_threshold: f32,
}

impl HandleTurnHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        requests: Arc<dyn RequestRepository>,
        classifier: Arc<dyn IntentClassifier>,
        catalog: Arc<dyn CatalogLookup>,
        directory: Arc<dyn DirectoryLookup>,
        chat: Arc<dyn ChatPlatform>,
        confidence_threshold: f32,
    ) -> Self {
        Self {
            conversations,
            requests,
            classifier,
            catalog,
            directory,
            chat,
            confidence_threshold,
        }
    }

    pub async fn handle(&self, cmd: HandleTurnCommand) -> Result<TurnOutcome, EngineError> {
        let conversation = match self.conversations.find_open_for_user(&cmd.user_id).await? {
            Some(existing) => existing,
            None => Conversation::new(cmd.user_id.clone(), cmd.channel_id.clone()),
        };

        if conversation.has_seen(&cmd.event_ts) {
            tracing::debug!(
                conversation_id = %conversation.id,
                event_ts = %cmd.event_ts,
                "skipping replayed chat event"
            );
            return Ok(TurnOutcome::Replayed);
        }

        match self.route(conversation, &cmd).await {
            Ok(outcome) => Ok(outcome),
            Err(err) if err.is_transient() => {
                // Recoverable collaborator failure: state is whatever was
                // last committed, the user is asked to retry.
                tracing::warn!(error = %err, user_id = %cmd.user_id, "turn failed transiently");
                self.notify(&cmd.channel_id, MSG_TRY_AGAIN).await;
                Ok(TurnOutcome::Clarification)
            }
            Err(err) => Err(err),
        }
    }

    async fn route(
        &self,
        conversation: Conversation,
        cmd: &HandleTurnCommand,
    ) -> Result<TurnOutcome, EngineError> {
        // A reply while a choice is pending is first interpreted as a
        // selection; anything else falls through to the classifier.
        if conversation.status == ConversationStatus::AwaitingSlot {
            if let Some(candidate) =
                select_candidate(&conversation.pending_candidates, &cmd.text)
            {
                let entry = self
                    .catalog
                    .get(&candidate.group_id)
                    .await?
                    .ok_or_else(|| {
                        EngineError::validation(format!(
                            "candidate group {} no longer in catalog",
                            candidate.group_id
                        ))
                    })?;
                return self.complete_with_entry(conversation, cmd, entry).await;
            }
        }

        let classification = self
            .classifier
            .classify(&cmd.text, &conversation.collected_slots)
            .await?;

        if classification.confidence < self.confidence_threshold {
            tracing::debug!(
                confidence = classification.confidence,
                threshold = self.confidence_threshold,
                "classification below confidence threshold"
            );
            return self.reply(conversation, cmd, MSG_NOT_UNDERSTOOD).await;
        }

        match classification.intent {
            Intent::CatalogHelp => {
                let listing = self.catalog_listing().await?;
                self.reply(conversation, cmd, &listing).await
            }
            Intent::Unknown => self.reply(conversation, cmd, MSG_NOT_UNDERSTOOD).await,
            Intent::RequestAccess => {
                self.resolve_group(conversation, cmd, classification).await
            }
        }
    }

    async fn resolve_group(
        &self,
        mut conversation: Conversation,
        cmd: &HandleTurnCommand,
        classification: Classification,
    ) -> Result<TurnOutcome, EngineError> {
        // A confident new ask while a choice is pending supersedes the
        // stale candidate list.
        if conversation.status == ConversationStatus::AwaitingSlot
            && classification.slots.contains_key(SLOT_TARGET_GROUP)
        {
            conversation.resume()?;
        }

        let fragment = classification
            .slots
            .get(SLOT_TARGET_GROUP)
            .cloned()
            .or_else(|| conversation.slot(SLOT_TARGET_GROUP).map(str::to_string));

        let Some(fragment) = fragment else {
            return self.reply(conversation, cmd, MSG_WHICH_GROUP).await;
        };

        let mut matches = self.catalog.resolve(&fragment).await?;
        match matches.len() {
            0 => {
                let text = format!(
                    "I couldn't find a group matching \"{}\". \
                     Could you rephrase, or ask what you can request?",
                    fragment
                );
                self.reply(conversation, cmd, &text).await
            }
            1 => {
                let entry = matches.remove(0);
                self.complete_with_entry(conversation, cmd, entry).await
            }
            _ => {
                let candidates: Vec<GroupCandidate> = matches
                    .iter()
                    .map(|entry| GroupCandidate {
                        group_id: entry.group_id.clone(),
                        display_name: entry.display_name.clone(),
                    })
                    .collect();
                let text = choice_prompt(&fragment, &candidates);

                conversation.await_choice(candidates)?;
                conversation.record_turn(&cmd.event_ts, Timestamp::now());
                self.conversations.save(&conversation).await?;

                self.notify(&cmd.channel_id, &text).await;
                Ok(TurnOutcome::AwaitingChoice)
            }
        }
    }

    /// Builds and persists the Request, completes the conversation, and
    /// only then confirms to the user.
    async fn complete_with_entry(
        &self,
        mut conversation: Conversation,
        cmd: &HandleTurnCommand,
        entry: CatalogEntry,
    ) -> Result<TurnOutcome, EngineError> {
        let requester_email = self.directory.email_of(&cmd.user_id).await?;

        let request = Request::new(
            cmd.user_id.clone(),
            requester_email,
            cmd.channel_id.clone(),
            entry.group_id.clone(),
            entry.display_name.clone(),
            entry.policy.approval_type,
        );
        self.requests.create(&request).await?;

        conversation.fill_slot(SLOT_TARGET_GROUP, entry.display_name.clone());
        conversation.record_turn(&cmd.event_ts, Timestamp::now());
        conversation.complete()?;
        self.conversations.save(&conversation).await?;

        tracing::info!(
            request_id = %request.id,
            requester = %request.requester_id,
            group = %request.target_group_id,
            approval_type = ?request.approval_type,
            "access request created"
        );

        let text = format!(
            "Got it — requesting access to *{}*. {}",
            entry.display_name,
            entry.policy.describe_requirement()
        );
        self.notify(&cmd.channel_id, &text).await;

        Ok(TurnOutcome::Completed(request))
    }

    /// Persists the turn marker, then sends a clarifying reply.
    async fn reply(
        &self,
        mut conversation: Conversation,
        cmd: &HandleTurnCommand,
        text: &str,
    ) -> Result<TurnOutcome, EngineError> {
        conversation.record_turn(&cmd.event_ts, Timestamp::now());
        self.conversations.save(&conversation).await?;
        self.notify(&cmd.channel_id, text).await;
        Ok(TurnOutcome::Clarification)
    }

    async fn catalog_listing(&self) -> Result<String, EngineError> {
        let entries = self.catalog.list().await?;
        if entries.is_empty() {
            return Ok("No requestable groups are configured right now.".to_string());
        }
        let mut lines = vec!["You can request access to:".to_string()];
        for entry in entries {
            let description = entry.description.as_deref().unwrap_or("");
            lines.push(format!(
                "• *{}* {} ({})",
                entry.display_name,
                description,
                entry.policy.describe_requirement()
            ));
        }
        Ok(lines.join("\n"))
    }

    /// Outward notifications are best-effort: persisted state already
    /// advanced, so a failed send must not fail the invocation.
    async fn notify(&self, channel: &ChannelId, text: &str) {
        if let Err(err) = self.chat.send_message(channel, text).await {
            tracing::warn!(error = %err, channel = %channel, "failed to send chat message");
        }
    }
}

/// Interprets a reply to a pending choice as a 1-based index or a unique
/// name match.
fn select_candidate<'a>(
    candidates: &'a [GroupCandidate],
    text: &str,
) -> Option<&'a GroupCandidate> {
    let trimmed = text.trim();

    if let Ok(index) = trimmed.parse::<usize>() {
        if index >= 1 && index <= candidates.len() {
            return Some(&candidates[index - 1]);
        }
        return None;
    }

    let lowered = trimmed.to_lowercase();
    let mut named: Vec<&GroupCandidate> = candidates
        .iter()
        .filter(|c| c.display_name.to_lowercase() == lowered)
        .collect();
    if named.is_empty() {
        named = candidates
            .iter()
            .filter(|c| c.display_name.to_lowercase().contains(&lowered))
            .collect();
    }
    match named.as_slice() {
        [only] => Some(only),
        _ => None,
    }
}

fn choice_prompt(fragment: &str, candidates: &[GroupCandidate]) -> String {
    let mut lines = vec![format!(
        "I found several groups matching \"{}\". Which one do you mean?",
        fragment
    )];
    for (i, candidate) in candidates.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, candidate.display_name));
    }
    lines.join("\n")
}
