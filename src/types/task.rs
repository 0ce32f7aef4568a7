//! Task lifecycle types.
//!
//! A [`TaskRecord`] is created in [`TaskStatus::Running`] when a prompt is
//! submitted with `codex_async`, and moves exactly once to a terminal state.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CodexError;
use crate::types::{preview, short_id, LIST_PREVIEW_CHARS};

/// Task lifecycle status.
///
/// # State Machine
///
/// ```text
/// Running -> Completed, Error
/// Completed -> (terminal, no transitions)
/// Error -> (terminal, no transitions)
/// ```
///
/// There is no cancelled state and no retry transition. A failed task stays
/// failed; retrying means submitting a new task.
///
/// # Examples
///
/// ```
/// use codex_mcp::TaskStatus;
///
/// assert!(TaskStatus::Running.can_transition_to(&TaskStatus::Completed));
/// assert!(!TaskStatus::Error.can_transition_to(&TaskStatus::Completed));
/// assert!(!TaskStatus::Running.can_transition_to(&TaskStatus::Running));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// The backend call is still in flight.
    Running,
    /// The backend returned text (terminal).
    Completed,
    /// The backend call failed (terminal).
    Error,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl TaskStatus {
    /// Returns `true` if no further transition is allowed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Returns `true` if moving from this status to `next` is allowed.
    pub fn can_transition_to(&self, next: &Self) -> bool {
        matches!(
            (self, next),
            (Self::Running, Self::Completed) | (Self::Running, Self::Error)
        )
    }

    /// Validates a transition, returning [`CodexError::InvalidTransition`]
    /// when it is rejected.
    pub fn validate_transition(&self, task_id: &str, next: &Self) -> Result<(), CodexError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CodexError::InvalidTransition {
                task_id: task_id.to_string(),
                from: *self,
                to: *next,
            })
        }
    }
}

/// The registry's record of one submitted prompt.
///
/// `result` holds the generated text once completed, or the error
/// description once failed. `conversation_id` is only set on successful
/// completion through a conversation-aware backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    /// Opaque short token identifying the task.
    pub task_id: String,
    /// Current lifecycle status.
    pub status: TaskStatus,
    /// The submitted prompt, never modified.
    pub prompt: String,
    /// The resolved model identifier.
    pub model: String,
    /// Creation time.
    pub submitted_at: DateTime<Utc>,
    /// Response text or error description, absent while running.
    pub result: Option<String>,
    /// Conversation the exchange was recorded in.
    pub conversation_id: Option<String>,
}

impl TaskRecord {
    /// Creates a record in the `Running` state with a fresh task id.
    ///
    /// # Examples
    ///
    /// ```
    /// use codex_mcp::{TaskRecord, TaskStatus};
    ///
    /// let record = TaskRecord::new("explain lifetimes", "gpt-4.1");
    /// assert_eq!(record.status, TaskStatus::Running);
    /// assert_eq!(record.task_id.len(), 8);
    /// assert!(record.result.is_none());
    /// ```
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_id(short_id(), prompt, model)
    }

    /// Creates a `Running` record with an explicit task id.
    pub fn with_id(
        task_id: impl Into<String>,
        prompt: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Running,
            prompt: prompt.into(),
            model: model.into(),
            submitted_at: Utc::now(),
            result: None,
            conversation_id: None,
        }
    }

    /// The response text, if the task completed.
    pub fn response(&self) -> Option<&str> {
        match self.status {
            TaskStatus::Completed => self.result.as_deref(),
            _ => None,
        }
    }

    /// The failure description, if the task failed.
    pub fn error(&self) -> Option<&str> {
        match self.status {
            TaskStatus::Error => self.result.as_deref(),
            _ => None,
        }
    }

    /// Submission time as an RFC 3339 string.
    pub fn submitted_at_rfc3339(&self) -> String {
        self.submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Builds the truncated listing entry for this task.
    pub fn summary(&self) -> TaskSummary {
        TaskSummary {
            task_id: self.task_id.clone(),
            status: self.status,
            model: self.model.clone(),
            prompt: preview(&self.prompt, LIST_PREVIEW_CHARS),
            submitted_at: self.submitted_at_rfc3339(),
        }
    }
}

/// One entry of `codex_list_tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    /// Task identifier.
    pub task_id: String,
    /// Status at the time of the snapshot.
    pub status: TaskStatus,
    /// Resolved model.
    pub model: String,
    /// Prompt preview.
    pub prompt: String,
    /// RFC 3339 submission time.
    pub submitted_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_status_display_matches_serde() {
        for status in [TaskStatus::Running, TaskStatus::Completed, TaskStatus::Error] {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, status.to_string());
        }
    }

    #[test]
    fn terminal_states() {
        assert!(!TaskStatus::Running.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Error.is_terminal());
    }

    #[test]
    fn terminal_states_reject_all_transitions() {
        for terminal in [TaskStatus::Completed, TaskStatus::Error] {
            for target in [TaskStatus::Running, TaskStatus::Completed, TaskStatus::Error] {
                assert!(
                    !terminal.can_transition_to(&target),
                    "{terminal} should not transition to {target}"
                );
            }
        }
    }

    #[test]
    fn validate_transition_err_names_task() {
        let err = TaskStatus::Completed
            .validate_transition("task-1", &TaskStatus::Error)
            .unwrap_err();
        assert!(err.to_string().contains("task-1"));
        assert!(TaskStatus::Running
            .validate_transition("task-1", &TaskStatus::Error)
            .is_ok());
    }

    #[test]
    fn response_and_error_follow_status() {
        let mut record = TaskRecord::with_id("abc12345", "q", "m");
        record.result = Some("text".to_string());
        assert_eq!(record.response(), None);

        record.status = TaskStatus::Completed;
        assert_eq!(record.response(), Some("text"));
        assert_eq!(record.error(), None);

        record.status = TaskStatus::Error;
        assert_eq!(record.error(), Some("text"));
        assert_eq!(record.response(), None);
    }

    #[test]
    fn summary_truncates_prompt_to_80_chars() {
        let record = TaskRecord::new("x".repeat(200), "gpt-4.1");
        let summary = record.summary();
        assert_eq!(summary.prompt.chars().count(), 80);
        assert_eq!(summary.task_id, record.task_id);
        assert_eq!(summary.status, TaskStatus::Running);
        assert!(summary.submitted_at.ends_with('Z'));
    }
}
