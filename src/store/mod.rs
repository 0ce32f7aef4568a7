//! In-memory stores for tasks and conversations.
//!
//! # Architecture
//!
//! - [`JobRegistry`](tasks::JobRegistry) -- task records keyed by task id,
//!   kept in submission order.
//! - [`ConversationStore`](conversations::ConversationStore) -- message
//!   histories keyed by conversation id, kept in creation order.
//!
//! Both are explicitly constructed and shared through `Arc`; there is no
//! process-global state. Every operation takes a `parking_lot` lock for one
//! short critical section and never holds it across an `.await`.
//!
//! # Retention
//!
//! Records live for the life of the process unless a [`RetentionPolicy`]
//! sets a bound.

pub mod conversations;
pub mod tasks;

pub use conversations::{ConversationStore, ResolvedConversation};
pub use tasks::JobRegistry;

/// Optional bounds on how many records the stores keep.
///
/// # Defaults
///
/// | Setting              | Default   | Description                                  |
/// |----------------------|-----------|----------------------------------------------|
/// | `max_finished_tasks` | `None`    | Completed/failed tasks kept, oldest evicted  |
/// | `max_conversations`  | `None`    | Conversations kept, oldest idle evicted      |
///
/// Running tasks are never evicted.
///
/// # Examples
///
/// ```
/// use codex_mcp::store::RetentionPolicy;
///
/// let policy = RetentionPolicy::default();
/// assert!(policy.is_unbounded());
///
/// let bounded = RetentionPolicy {
///     max_finished_tasks: Some(500),
///     ..RetentionPolicy::default()
/// };
/// assert!(!bounded.is_unbounded());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Maximum number of terminal tasks to keep.
    pub max_finished_tasks: Option<usize>,
    /// Maximum number of conversations to keep.
    pub max_conversations: Option<usize>,
}

impl RetentionPolicy {
    /// Returns `true` when neither store is bounded.
    pub fn is_unbounded(&self) -> bool {
        self.max_finished_tasks.is_none() && self.max_conversations.is_none()
    }
}
