//! Domain types shared by the stores, the executor and the tool façade.
//!
//! - [`task`] - Task lifecycle status, records and list summaries
//! - [`conversation`] - Role-tagged turns and conversation summaries

pub mod conversation;
pub mod task;

pub use conversation::{ConversationSummary, Message, Role};
pub use task::{TaskRecord, TaskStatus, TaskSummary};

use uuid::Uuid;

/// Length of the opaque task and conversation tokens.
pub const SHORT_ID_LEN: usize = 8;

/// Characters kept from a prompt in `codex_list_tasks` and conversation summaries.
pub const LIST_PREVIEW_CHARS: usize = 80;

/// Characters kept from a prompt in `codex_poll` responses.
pub const POLL_PREVIEW_CHARS: usize = 100;

/// Generates an opaque 8-character token from a random UUIDv4.
///
/// # Examples
///
/// ```
/// let id = codex_mcp::types::short_id();
/// assert_eq!(id.len(), 8);
/// assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
pub fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(SHORT_ID_LEN);
    id
}

/// Returns at most `max_chars` characters of `text`.
///
/// Truncates on character boundaries, never inside a multi-byte sequence.
///
/// # Examples
///
/// ```
/// use codex_mcp::types::preview;
///
/// assert_eq!(preview("hello world", 5), "hello");
/// assert_eq!(preview("héllo", 2), "hé");
/// assert_eq!(preview("short", 80), "short");
/// ```
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
