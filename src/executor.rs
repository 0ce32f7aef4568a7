//! Synchronous and asynchronous execution paths.
//!
//! [`Executor::execute`] runs one prompt inline, threading conversation
//! history when the backend supports it. [`Executor::submit`] registers a
//! task and runs the same logic on a detached tokio task that finishes the
//! task record exactly once.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::backend::{BackendError, BackendInvoker, InvokeRequest};
use crate::store::{ConversationStore, JobRegistry};
use crate::types::{Message, Role, TaskRecord};

/// Outcome of a successful [`Executor::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Generated text.
    pub response: String,
    /// Conversation the exchange was recorded in, if the backend keeps history.
    pub conversation_id: Option<String>,
}

/// A task handed to the background.
#[derive(Debug)]
pub struct Submitted {
    /// Snapshot of the freshly created `running` record.
    pub task: TaskRecord,
    /// Handle of the detached unit of work. Dropping it does not cancel it.
    pub handle: JoinHandle<()>,
}

/// Glue between the backend and the two stores.
///
/// Cheap to clone; clones share the same backend and stores.
#[derive(Clone)]
pub struct Executor {
    backend: Arc<dyn BackendInvoker>,
    tasks: Arc<JobRegistry>,
    conversations: Arc<ConversationStore>,
    default_model: String,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("backend", &self.backend.name())
            .field("default_model", &self.default_model)
            .finish_non_exhaustive()
    }
}

impl Executor {
    /// Wires an executor from explicitly constructed parts.
    pub fn new(
        backend: Arc<dyn BackendInvoker>,
        tasks: Arc<JobRegistry>,
        conversations: Arc<ConversationStore>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            tasks,
            conversations,
            default_model: default_model.into(),
        }
    }

    /// The job registry.
    pub fn tasks(&self) -> &Arc<JobRegistry> {
        &self.tasks
    }

    /// The conversation store.
    pub fn conversations(&self) -> &Arc<ConversationStore> {
        &self.conversations
    }

    /// Whether multi-turn conversations are available.
    pub fn supports_conversations(&self) -> bool {
        self.backend.supports_history()
    }

    /// Returns `model` unless it is absent or empty, else the default.
    pub fn resolve_model(&self, model: Option<&str>) -> String {
        match model.map(str::trim) {
            Some(model) if !model.is_empty() => model.to_string(),
            _ => self.default_model.clone(),
        }
    }

    /// Runs one prompt and waits for the reply.
    ///
    /// With a history-aware backend the user turn is appended before the
    /// call. If the call fails on an existing conversation the user turn stays
    /// recorded; a conversation created by this call is removed instead. The
    /// assistant turn is only appended on success. Turns on the same
    /// conversation are serialized. The job registry is never touched.
    pub async fn execute(
        &self,
        prompt: &str,
        model: &str,
        conversation_id: Option<&str>,
    ) -> Result<Execution, BackendError> {
        if !self.backend.supports_history() {
            let response = self.backend.invoke(InvokeRequest::new(prompt, model)).await?;
            return Ok(Execution {
                response,
                conversation_id: None,
            });
        }

        let resolved = self.conversations.resolve_or_create(conversation_id);
        let created = resolved.created;
        let conversation_id = resolved.conversation_id;
        let _turn = resolved.turn_lock.lock().await;

        self.record_turn(&conversation_id, Role::User, prompt);
        let history = self.conversations.messages(&conversation_id).unwrap_or_else(|| {
            let mut messages = resolved.messages;
            messages.push(Message::user(prompt));
            messages
        });

        let request = InvokeRequest::new(prompt, model).with_history(history);
        let response = match self.backend.invoke(request).await {
            Ok(response) => response,
            Err(e) => {
                // a conversation the caller never saw is rolled back entirely
                if created {
                    self.conversations.remove(&conversation_id);
                }
                tracing::warn!(
                    conversation_id = %conversation_id,
                    backend = self.backend.name(),
                    discarded = created,
                    error = %e,
                    "backend call failed"
                );
                return Err(e);
            }
        };

        self.record_turn(&conversation_id, Role::Assistant, response.clone());

        Ok(Execution {
            response,
            conversation_id: Some(conversation_id),
        })
    }

    fn record_turn(&self, conversation_id: &str, role: Role, content: impl Into<String>) {
        if !self.conversations.append(conversation_id, role, content) {
            tracing::warn!(conversation_id, %role, "conversation no longer stored, turn dropped");
        }
    }

    /// Registers a `running` task and runs it in the background.
    ///
    /// Returns before the backend call resolves. The detached work finishes
    /// the task with [`JobRegistry::complete`] or [`JobRegistry::fail`].
    pub fn submit(&self, prompt: &str, model: &str, conversation_id: Option<&str>) -> Submitted {
        let task = self.tasks.create(prompt, model);
        tracing::info!(task_id = %task.task_id, model, "task submitted");

        let executor = self.clone();
        let task_id = task.task_id.clone();
        let prompt = prompt.to_string();
        let model = model.to_string();
        let conversation_id = conversation_id.map(str::to_string);
        let span = tracing::info_span!("codex_task", task_id = %task_id);

        let handle = tokio::spawn(
            async move {
                let outcome = executor
                    .execute(&prompt, &model, conversation_id.as_deref())
                    .await;
                let finished = match outcome {
                    Ok(execution) => {
                        tracing::info!("task completed");
                        executor.tasks.complete(
                            &task_id,
                            execution.response,
                            execution.conversation_id,
                        )
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "task failed");
                        executor.tasks.fail(&task_id, e.to_string())
                    }
                };
                if let Err(e) = finished {
                    tracing::warn!(error = %e, "could not record task outcome");
                }
            }
            .instrument(span),
        );

        Submitted { task, handle }
    }
}
