//! Error types for the codex MCP server.
//!
//! [`CodexError`] is the crate-wide error. Backend failures carry a
//! [`BackendError`](crate::backend::BackendError) whose display text is the
//! description recorded on failed tasks and returned in error payloads.

use thiserror::Error;

use crate::backend::BackendError;
use crate::types::task::TaskStatus;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CodexError>;

/// Errors that can occur while serving codex tools.
///
/// # Examples
///
/// ```
/// use codex_mcp::CodexError;
///
/// let err = CodexError::NotFound {
///     task_id: "doesnotexist".to_string(),
/// };
/// assert_eq!(err.to_string(), "Unknown task_id: doesnotexist");
/// assert!(!err.is_fatal());
/// ```
#[derive(Debug, Error)]
pub enum CodexError {
    /// No task with this id was ever submitted (or it was evicted).
    #[error("Unknown task_id: {task_id}")]
    NotFound {
        /// The task ID that was looked up.
        task_id: String,
    },

    /// A task was asked to leave a terminal state.
    #[error("invalid transition from {from} to {to} for task {task_id}")]
    InvalidTransition {
        /// The task that was being transitioned.
        task_id: String,
        /// The current status of the task.
        from: TaskStatus,
        /// The target status that was rejected.
        to: TaskStatus,
    },

    /// The backend invocation failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A credential or external dependency is absent at startup.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),
}

impl CodexError {
    /// Returns `true` for errors that must abort startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConfigurationMissing(_))
    }
}
