//! Conversation store.
//!
//! Holds the ordered message history of each conversation. The history is
//! exactly the context window sent to a conversation-aware backend, so turn
//! order matters: one system turn at creation, then user/assistant pairs.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tokio::sync::Mutex as AsyncMutex;

use crate::store::RetentionPolicy;
use crate::types::conversation::{ConversationSummary, Message, Role};
use crate::types::{preview, short_id, LIST_PREVIEW_CHARS};

#[derive(Debug)]
struct ConversationRecord {
    messages: Vec<Message>,
    turn_lock: Arc<AsyncMutex<()>>,
}

/// Result of [`ConversationStore::resolve_or_create`].
///
/// Holding it pins the conversation: retention never evicts a conversation
/// whose turn lock is shared outside the store.
#[derive(Debug, Clone)]
pub struct ResolvedConversation {
    /// The token to use for appends; freshly allocated when `created`.
    pub conversation_id: String,
    /// History at resolution time.
    pub messages: Vec<Message>,
    /// `true` if a new conversation was allocated.
    pub created: bool,
    /// Lock serializing turns within this conversation.
    pub turn_lock: Arc<AsyncMutex<()>>,
}

/// Thread-safe in-memory store of conversation histories.
///
/// # Examples
///
/// ```
/// use codex_mcp::store::ConversationStore;
/// use codex_mcp::Role;
///
/// let store = ConversationStore::new("You are Codex.");
/// let conv = store.resolve_or_create(None);
/// assert!(conv.created);
/// assert_eq!(conv.messages.len(), 1);
/// assert_eq!(conv.messages[0].role, Role::System);
///
/// assert!(store.append(&conv.conversation_id, Role::User, "hi"));
/// let again = store.resolve_or_create(Some(&conv.conversation_id));
/// assert!(!again.created);
/// assert_eq!(again.messages.len(), 2);
/// ```
#[derive(Debug)]
pub struct ConversationStore {
    system_prompt: String,
    conversations: RwLock<IndexMap<String, ConversationRecord>>,
    max_conversations: Option<usize>,
}

impl ConversationStore {
    /// Creates an empty store seeding new conversations with `system_prompt`.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            conversations: RwLock::new(IndexMap::new()),
            max_conversations: None,
        }
    }

    /// Applies the conversation bound of a retention policy.
    pub fn with_retention(mut self, policy: RetentionPolicy) -> Self {
        self.max_conversations = policy.max_conversations;
        self
    }

    /// The instruction seeded into every new conversation.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Looks up a conversation, creating a new one when the token is absent,
    /// empty or unknown.
    ///
    /// A new conversation gets a fresh token and a history of exactly one
    /// system turn. Unknown tokens are never reused.
    pub fn resolve_or_create(&self, conversation_id: Option<&str>) -> ResolvedConversation {
        let mut conversations = self.conversations.write();

        if let Some(id) = conversation_id.filter(|id| !id.is_empty()) {
            if let Some(record) = conversations.get(id) {
                return ResolvedConversation {
                    conversation_id: id.to_string(),
                    messages: record.messages.clone(),
                    created: false,
                    turn_lock: Arc::clone(&record.turn_lock),
                };
            }
            tracing::debug!(conversation_id = id, "unknown conversation, starting a new one");
        }

        let mut new_id = short_id();
        while conversations.contains_key(&new_id) {
            new_id = short_id();
        }
        let messages = vec![Message::system(self.system_prompt.clone())];
        let turn_lock = Arc::new(AsyncMutex::new(()));
        conversations.insert(
            new_id.clone(),
            ConversationRecord {
                messages: messages.clone(),
                turn_lock: Arc::clone(&turn_lock),
            },
        );

        if let Some(max) = self.max_conversations {
            evict_idle(&mut conversations, max.max(1));
        }

        ResolvedConversation {
            conversation_id: new_id,
            messages,
            created: true,
            turn_lock,
        }
    }

    /// Drops a conversation. Returns `false` if it was unknown.
    pub fn remove(&self, conversation_id: &str) -> bool {
        self.conversations
            .write()
            .shift_remove(conversation_id)
            .is_some()
    }

    /// Appends one turn. Returns `false` if the conversation is unknown.
    pub fn append(&self, conversation_id: &str, role: Role, content: impl Into<String>) -> bool {
        match self.conversations.write().get_mut(conversation_id) {
            Some(record) => {
                record.messages.push(Message::new(role, content));
                true
            }
            None => false,
        }
    }

    /// Snapshot of a conversation's history.
    pub fn messages(&self, conversation_id: &str) -> Option<Vec<Message>> {
        self.conversations
            .read()
            .get(conversation_id)
            .map(|record| record.messages.clone())
    }

    /// Summaries of all conversations in creation order.
    pub fn list(&self) -> Vec<ConversationSummary> {
        self.conversations
            .read()
            .iter()
            .map(|(id, record)| ConversationSummary {
                conversation_id: id.clone(),
                message_count: record.messages.len(),
                last_user_msg: record
                    .messages
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::User)
                    .map(|m| preview(&m.content, LIST_PREVIEW_CHARS))
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// Number of conversations held.
    pub fn len(&self) -> usize {
        self.conversations.read().len()
    }

    /// Returns `true` if no conversation is held.
    pub fn is_empty(&self) -> bool {
        self.conversations.read().is_empty()
    }
}

/// Drops the oldest idle conversations until at most `max` remain.
///
/// A conversation is idle when nobody outside the store holds its turn lock.
/// Pinned conversations are skipped, so the store may briefly exceed `max`.
fn evict_idle(conversations: &mut IndexMap<String, ConversationRecord>, max: usize) {
    let mut excess = conversations.len().saturating_sub(max);
    if excess == 0 {
        return;
    }
    let before = conversations.len();
    conversations.retain(|_, record| {
        if excess > 0 && Arc::strong_count(&record.turn_lock) == 1 {
            excess -= 1;
            false
        } else {
            true
        }
    });
    tracing::debug!(
        evicted = before - conversations.len(),
        remaining = conversations.len(),
        "evicted idle conversations"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_and_unknown_ids_allocate_new_conversations() {
        let store = ConversationStore::new("sys");
        let a = store.resolve_or_create(Some(""));
        let b = store.resolve_or_create(Some("deadbeef"));
        assert!(a.created && b.created);
        assert_ne!(a.conversation_id, b.conversation_id);
        assert_ne!(b.conversation_id, "deadbeef");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn append_to_unknown_conversation_is_noop() {
        let store = ConversationStore::new("sys");
        assert!(!store.append("missing", Role::User, "hi"));
        assert!(store.is_empty());
        assert!(store.messages("missing").is_none());
    }

    #[test]
    fn list_reports_last_user_message() {
        let store = ConversationStore::new("sys");
        let id = store.resolve_or_create(None).conversation_id;
        store.append(&id, Role::User, "first question");
        store.append(&id, Role::Assistant, "answer");
        store.append(&id, Role::User, "y".repeat(120));

        let summaries = store.list();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].conversation_id, id);
        assert_eq!(summaries[0].message_count, 4);
        assert_eq!(summaries[0].last_user_msg, "y".repeat(80));
    }

    #[test]
    fn list_without_user_turns_has_empty_preview() {
        let store = ConversationStore::new("sys");
        store.resolve_or_create(None);
        assert_eq!(store.list()[0].last_user_msg, "");
    }

    #[test]
    fn retention_drops_oldest_conversation() {
        let store = ConversationStore::new("sys").with_retention(RetentionPolicy {
            max_conversations: Some(2),
            ..RetentionPolicy::default()
        });
        let first = store.resolve_or_create(None).conversation_id;
        let second = store.resolve_or_create(None).conversation_id;
        let third = store.resolve_or_create(None).conversation_id;

        assert!(store.messages(&first).is_none());
        let ids: Vec<String> = store.list().into_iter().map(|c| c.conversation_id).collect();
        assert_eq!(ids, vec![second, third]);
    }

    #[test]
    fn retention_skips_pinned_conversations() {
        let store = ConversationStore::new("sys").with_retention(RetentionPolicy {
            max_conversations: Some(1),
            ..RetentionPolicy::default()
        });
        let pinned = store.resolve_or_create(None);
        let idle = store.resolve_or_create(None).conversation_id;
        assert_eq!(store.len(), 2);

        // the next allocation evicts the idle one, never the pinned one
        let newest = store.resolve_or_create(None);
        assert!(store.messages(&pinned.conversation_id).is_some());
        assert!(store.messages(&idle).is_none());
        assert!(store.messages(&newest.conversation_id).is_some());

        drop(pinned);
        drop(newest);
        let last = store.resolve_or_create(None).conversation_id;
        let ids: Vec<String> = store.list().into_iter().map(|c| c.conversation_id).collect();
        assert_eq!(ids, vec![last]);
    }

    #[test]
    fn remove_forgets_conversation() {
        let store = ConversationStore::new("sys");
        let keep = store.resolve_or_create(None).conversation_id;
        let gone = store.resolve_or_create(None).conversation_id;

        assert!(store.remove(&gone));
        assert!(!store.remove(&gone));
        assert!(store.messages(&gone).is_none());
        let ids: Vec<String> = store.list().into_iter().map(|c| c.conversation_id).collect();
        assert_eq!(ids, vec![keep]);
    }
}
