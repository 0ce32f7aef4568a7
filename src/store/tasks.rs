//! Job registry for asynchronous codex tasks.
//!
//! [`JobRegistry`] owns every [`TaskRecord`]. Records are created in the
//! `running` state by [`create`](JobRegistry::create) and finished exactly
//! once by [`complete`](JobRegistry::complete) or [`fail`](JobRegistry::fail),
//! which only the detached unit of work owning the task id calls.
//!
//! # Concurrency
//!
//! Records live in a `parking_lot::RwLock<IndexMap<..>>`. Each transition is
//! validated and applied under one write lock, so a reader never observes a
//! status without its result.

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::{CodexError, Result};
use crate::store::RetentionPolicy;
use crate::types::task::{TaskRecord, TaskStatus, TaskSummary};
use crate::types::short_id;

/// Thread-safe in-memory registry of submitted tasks.
///
/// # Examples
///
/// ```
/// use codex_mcp::store::JobRegistry;
/// use codex_mcp::TaskStatus;
///
/// let registry = JobRegistry::new();
/// let record = registry.create("2+2?", "gpt-4.1");
/// assert_eq!(registry.get(&record.task_id).unwrap().status, TaskStatus::Running);
///
/// registry.complete(&record.task_id, "4", None).unwrap();
/// assert_eq!(registry.get(&record.task_id).unwrap().response(), Some("4"));
/// ```
#[derive(Debug, Default)]
pub struct JobRegistry {
    tasks: RwLock<IndexMap<String, TaskRecord>>,
    max_finished: Option<usize>,
}

impl JobRegistry {
    /// Creates an empty, unbounded registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the task bound of a retention policy.
    pub fn with_retention(mut self, policy: RetentionPolicy) -> Self {
        self.max_finished = policy.max_finished_tasks;
        self
    }

    /// Allocates a new `running` task and returns a copy of it.
    ///
    /// The task id is unique among the records currently held.
    pub fn create(&self, prompt: impl Into<String>, model: impl Into<String>) -> TaskRecord {
        let mut tasks = self.tasks.write();
        let mut task_id = short_id();
        while tasks.contains_key(&task_id) {
            task_id = short_id();
        }
        let record = TaskRecord::with_id(task_id.clone(), prompt, model);
        tasks.insert(task_id, record.clone());
        tracing::debug!(task_id = %record.task_id, model = %record.model, "task registered");
        record
    }

    /// Marks a running task completed with its response text.
    pub fn complete(
        &self,
        task_id: &str,
        response: impl Into<String>,
        conversation_id: Option<String>,
    ) -> Result<()> {
        self.finish(task_id, TaskStatus::Completed, response.into(), conversation_id)
    }

    /// Marks a running task failed with an error description.
    pub fn fail(&self, task_id: &str, error: impl Into<String>) -> Result<()> {
        self.finish(task_id, TaskStatus::Error, error.into(), None)
    }

    /// Returns a snapshot of one task.
    pub fn get(&self, task_id: &str) -> Result<TaskRecord> {
        self.tasks
            .read()
            .get(task_id)
            .cloned()
            .ok_or_else(|| CodexError::NotFound {
                task_id: task_id.to_string(),
            })
    }

    /// Returns summaries of all tasks in submission order.
    pub fn list_all(&self) -> Vec<TaskSummary> {
        self.tasks.read().values().map(TaskRecord::summary).collect()
    }

    /// Number of tasks held.
    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    /// Returns `true` if no task is held.
    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }

    fn finish(
        &self,
        task_id: &str,
        status: TaskStatus,
        result: String,
        conversation_id: Option<String>,
    ) -> Result<()> {
        let mut tasks = self.tasks.write();
        let record = tasks
            .get_mut(task_id)
            .ok_or_else(|| CodexError::NotFound {
                task_id: task_id.to_string(),
            })?;
        record.status.validate_transition(task_id, &status)?;

        record.status = status;
        record.result = Some(result);
        record.conversation_id = conversation_id;
        tracing::debug!(task_id, %status, "task finished");

        if let Some(max) = self.max_finished {
            evict_finished(&mut tasks, max);
        }
        Ok(())
    }
}

/// Drops the oldest terminal tasks until at most `max` remain.
fn evict_finished(tasks: &mut IndexMap<String, TaskRecord>, max: usize) {
    let finished = tasks.values().filter(|t| t.status.is_terminal()).count();
    let mut excess = finished.saturating_sub(max);
    if excess == 0 {
        return;
    }
    tasks.retain(|_, task| {
        if excess > 0 && task.status.is_terminal() {
            excess -= 1;
            false
        } else {
            true
        }
    });
    tracing::debug!(remaining = tasks.len(), "evicted finished tasks");
}
