//! Test backends shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use codex_mcp::server::{CodexTools, PollArgs, PollResponse, TaskView};
use codex_mcp::store::{ConversationStore, JobRegistry};
use codex_mcp::{BackendError, BackendInvoker, Executor, InvokeRequest};

pub const SYSTEM_PROMPT: &str = "You are Codex.";
pub const DEFAULT_MODEL: &str = "gpt-4.1";

/// Replies from a script and records every request.
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, BackendError>>>,
    requests: Mutex<Vec<InvokeRequest>>,
    history: bool,
}

impl ScriptedBackend {
    pub fn new(history: bool) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            history,
        }
    }

    pub fn reply(self, text: &str) -> Self {
        self.replies.lock().push_back(Ok(text.to_string()));
        self
    }

    pub fn fail(self, error: BackendError) -> Self {
        self.replies.lock().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<InvokeRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl BackendInvoker for ScriptedBackend {
    async fn invoke(&self, request: InvokeRequest) -> Result<String, BackendError> {
        self.requests.lock().push(request);
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok("default reply".to_string()))
    }

    fn supports_history(&self) -> bool {
        self.history
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Blocks every call until a permit is released, then echoes the prompt.
pub struct GatedBackend {
    gate: Semaphore,
    history: bool,
}

impl GatedBackend {
    pub fn new(history: bool) -> Self {
        Self {
            gate: Semaphore::new(0),
            history,
        }
    }

    /// Lets `n` pending or future calls finish.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }
}

#[async_trait]
impl BackendInvoker for GatedBackend {
    async fn invoke(&self, request: InvokeRequest) -> Result<String, BackendError> {
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        permit.forget();
        Ok(format!("answer to {}", request.prompt))
    }

    fn supports_history(&self) -> bool {
        self.history
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}

pub fn executor_with(backend: Arc<dyn BackendInvoker>) -> Executor {
    Executor::new(
        backend,
        Arc::new(JobRegistry::new()),
        Arc::new(ConversationStore::new(SYSTEM_PROMPT)),
        DEFAULT_MODEL,
    )
}

pub fn tools_with(backend: Arc<dyn BackendInvoker>) -> CodexTools {
    CodexTools::new(executor_with(backend))
}

/// Polls until the task leaves `running`, panicking after ~2 seconds.
pub async fn wait_for_terminal(tools: &CodexTools, task_id: &str) -> TaskView {
    for _ in 0..200 {
        if let PollResponse::Task(view) = tools.poll(PollArgs {
            task_id: task_id.to_string(),
        }) {
            if view.status.is_terminal() {
                return view;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("task {task_id} never reached a terminal state");
}
