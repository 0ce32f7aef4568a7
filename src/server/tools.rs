//! The codex tool surface.
//!
//! [`CodexTools`] turns tool arguments into executor and store calls and
//! builds the JSON payloads returned to MCP clients. The `*Tool` structs are
//! thin [`ToolHandler`] adapters around it.
//!
//! Backend failures never escape as protocol errors: they become
//! `{"status": "error", ...}` payloads (sync) or `error` task states (async).
//! Only malformed arguments are rejected with a validation error.

use std::sync::Arc;

use async_trait::async_trait;
use pmcp::types::ToolInfo;
use pmcp::{RequestHandlerExtra, ToolHandler};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::executor::Executor;
use crate::types::{preview, ConversationSummary, TaskRecord, TaskStatus, TaskSummary};
use crate::types::POLL_PREVIEW_CHARS;

/// Tool names as registered with the server.
pub mod names {
    /// Synchronous prompt.
    pub const EXEC: &str = "codex_exec";
    /// Fire-and-forget prompt.
    pub const ASYNC: &str = "codex_async";
    /// Task status lookup.
    pub const POLL: &str = "codex_poll";
    /// Task listing.
    pub const LIST_TASKS: &str = "codex_list_tasks";
    /// Conversation listing.
    pub const CONVERSATIONS: &str = "codex_conversations";
}

/// Arguments of `codex_exec` and `codex_async`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptArgs {
    /// The question or prompt.
    pub prompt: String,
    /// Model override; empty means the default.
    #[serde(default)]
    pub model: Option<String>,
    /// Conversation to continue; empty means a new one.
    #[serde(default)]
    pub conversation_id: Option<String>,
}

impl PromptArgs {
    /// Arguments for a new conversation with the default model.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Sets the conversation to continue.
    pub fn in_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    /// Sets the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    fn conversation(&self) -> Option<&str> {
        self.conversation_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Arguments of `codex_poll`.
#[derive(Debug, Clone, Deserialize)]
pub struct PollArgs {
    /// Task id returned by `codex_async`.
    pub task_id: String,
}

/// Payload of `codex_exec`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecResponse {
    /// The backend answered.
    Success {
        /// Resolved model.
        model: String,
        /// Conversation to pass back for a follow-up.
        #[serde(skip_serializing_if = "Option::is_none")]
        conversation_id: Option<String>,
        /// Generated text.
        response: String,
        /// Follow-up instructions for the caller.
        #[serde(skip_serializing_if = "Option::is_none")]
        hint: Option<String>,
    },
    /// The backend failed.
    Error {
        /// Resolved model.
        model: String,
        /// Failure description.
        error: String,
    },
}

/// Payload of `codex_async`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitResponse {
    /// Always `"submitted"`.
    pub status: &'static str,
    /// Id to poll.
    pub task_id: String,
    /// Resolved model.
    pub model: String,
    /// Follow-up instructions for the caller.
    pub hint: String,
}

/// Task view returned by `codex_poll`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    /// Task id.
    pub task_id: String,
    /// Current status.
    pub status: TaskStatus,
    /// Resolved model.
    pub model: String,
    /// Prompt preview.
    pub prompt: String,
    /// Generated text, once completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Conversation the exchange was recorded in, once completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// Follow-up instructions, once completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Failure description, once failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&TaskRecord> for TaskView {
    fn from(task: &TaskRecord) -> Self {
        let conversation_id = task.response().and(task.conversation_id.clone());
        Self {
            task_id: task.task_id.clone(),
            status: task.status,
            model: task.model.clone(),
            prompt: preview(&task.prompt, POLL_PREVIEW_CHARS),
            response: task.response().map(str::to_string),
            hint: conversation_id.as_deref().map(continue_hint),
            conversation_id,
            error: task.error().map(str::to_string),
        }
    }
}

/// `{"status": "error", "error": ...}` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    /// Always `"error"`.
    pub status: &'static str,
    /// Description.
    pub error: String,
}

impl ErrorPayload {
    /// Builds an error payload.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            status: "error",
            error: error.into(),
        }
    }
}

/// Payload of `codex_poll`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PollResponse {
    /// The task exists.
    Task(TaskView),
    /// The task id is unknown.
    Unknown(ErrorPayload),
}

fn continue_hint(conversation_id: &str) -> String {
    format!("Use conversation_id='{conversation_id}' to continue this discussion.")
}

/// Tool façade over an [`Executor`].
#[derive(Debug, Clone)]
pub struct CodexTools {
    executor: Executor,
}

impl CodexTools {
    /// Wraps an executor.
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    /// The underlying executor.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Names of the tools this façade serves, in registration order.
    pub fn tool_names(&self) -> Vec<&'static str> {
        let mut tools = vec![names::EXEC, names::ASYNC, names::POLL, names::LIST_TASKS];
        if self.executor.supports_conversations() {
            tools.push(names::CONVERSATIONS);
        }
        tools
    }

    /// `codex_exec`: runs the prompt and waits for the answer.
    pub async fn exec(&self, args: PromptArgs) -> ExecResponse {
        let model = self.executor.resolve_model(args.model.as_deref());
        match self
            .executor
            .execute(&args.prompt, &model, args.conversation())
            .await
        {
            Ok(execution) => ExecResponse::Success {
                model,
                hint: execution.conversation_id.as_deref().map(continue_hint),
                conversation_id: execution.conversation_id,
                response: execution.response,
            },
            Err(e) => ExecResponse::Error {
                model,
                error: e.to_string(),
            },
        }
    }

    /// `codex_async`: registers a task and returns its id immediately.
    pub fn submit(&self, args: PromptArgs) -> SubmitResponse {
        let model = self.executor.resolve_model(args.model.as_deref());
        let submitted = self
            .executor
            .submit(&args.prompt, &model, args.conversation());
        let task_id = submitted.task.task_id;
        SubmitResponse {
            status: "submitted",
            hint: format!("Use codex_poll(task_id='{task_id}') to check results."),
            task_id,
            model,
        }
    }

    /// `codex_poll`: current state of one task.
    pub fn poll(&self, args: PollArgs) -> PollResponse {
        match self.executor.tasks().get(&args.task_id) {
            Ok(task) => PollResponse::Task(TaskView::from(&task)),
            Err(e) => PollResponse::Unknown(ErrorPayload::new(e.to_string())),
        }
    }

    /// `codex_list_tasks`: every task in submission order.
    pub fn list_tasks(&self) -> Vec<TaskSummary> {
        self.executor.tasks().list_all()
    }

    /// `codex_conversations`: every conversation in creation order.
    pub fn conversations(&self) -> Vec<ConversationSummary> {
        self.executor.conversations().list()
    }
}

fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> pmcp::Result<T> {
    serde_json::from_value(args)
        .map_err(|e| pmcp::Error::validation(format!("invalid arguments for {tool}: {e}")))
}

fn prompt_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "prompt": {
                "type": "string",
                "description": "The question or prompt to send to Codex."
            },
            "model": {
                "type": "string",
                "description": "Model to use, e.g. \"gpt-5.1\" or \"gpt-4.1\". Leave empty for the default."
            },
            "conversation_id": {
                "type": "string",
                "description": "Conversation ID to continue a previous discussion. Leave empty for a new conversation."
            }
        },
        "required": ["prompt"]
    })
}

fn empty_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

/// `codex_exec` handler.
pub struct ExecTool {
    tools: Arc<CodexTools>,
}

impl ExecTool {
    /// Wraps the façade.
    pub fn new(tools: Arc<CodexTools>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl ToolHandler for ExecTool {
    async fn handle(&self, args: Value, _extra: RequestHandlerExtra) -> pmcp::Result<Value> {
        let args: PromptArgs = parse_args(names::EXEC, args)?;
        Ok(serde_json::to_value(self.tools.exec(args).await)?)
    }

    fn metadata(&self) -> Option<ToolInfo> {
        Some(ToolInfo::new(
            names::EXEC,
            Some("Ask Codex (OpenAI) a question and get a synchronous response.".to_string()),
            prompt_schema(),
        ))
    }
}

/// `codex_async` handler.
pub struct AsyncTool {
    tools: Arc<CodexTools>,
}

impl AsyncTool {
    /// Wraps the façade.
    pub fn new(tools: Arc<CodexTools>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl ToolHandler for AsyncTool {
    async fn handle(&self, args: Value, _extra: RequestHandlerExtra) -> pmcp::Result<Value> {
        let args: PromptArgs = parse_args(names::ASYNC, args)?;
        Ok(serde_json::to_value(self.tools.submit(args))?)
    }

    fn metadata(&self) -> Option<ToolInfo> {
        Some(ToolInfo::new(
            names::ASYNC,
            Some(
                "Submit an async question to Codex. Returns a task_id immediately; \
                 use codex_poll to check results later."
                    .to_string(),
            ),
            prompt_schema(),
        ))
    }
}

/// `codex_poll` handler.
pub struct PollTool {
    tools: Arc<CodexTools>,
}

impl PollTool {
    /// Wraps the façade.
    pub fn new(tools: Arc<CodexTools>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl ToolHandler for PollTool {
    async fn handle(&self, args: Value, _extra: RequestHandlerExtra) -> pmcp::Result<Value> {
        let args: PollArgs = parse_args(names::POLL, args)?;
        Ok(serde_json::to_value(self.tools.poll(args))?)
    }

    fn metadata(&self) -> Option<ToolInfo> {
        Some(ToolInfo::new(
            names::POLL,
            Some("Check the status/result of an async Codex task.".to_string()),
            json!({
                "type": "object",
                "properties": {
                    "task_id": {
                        "type": "string",
                        "description": "The task ID returned by codex_async."
                    }
                },
                "required": ["task_id"]
            }),
        ))
    }
}

/// `codex_list_tasks` handler.
pub struct ListTasksTool {
    tools: Arc<CodexTools>,
}

impl ListTasksTool {
    /// Wraps the façade.
    pub fn new(tools: Arc<CodexTools>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl ToolHandler for ListTasksTool {
    async fn handle(&self, _args: Value, _extra: RequestHandlerExtra) -> pmcp::Result<Value> {
        Ok(serde_json::to_value(self.tools.list_tasks())?)
    }

    fn metadata(&self) -> Option<ToolInfo> {
        Some(ToolInfo::new(
            names::LIST_TASKS,
            Some("List all async Codex tasks and their statuses.".to_string()),
            empty_schema(),
        ))
    }
}

/// `codex_conversations` handler.
pub struct ConversationsTool {
    tools: Arc<CodexTools>,
}

impl ConversationsTool {
    /// Wraps the façade.
    pub fn new(tools: Arc<CodexTools>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl ToolHandler for ConversationsTool {
    async fn handle(&self, _args: Value, _extra: RequestHandlerExtra) -> pmcp::Result<Value> {
        Ok(serde_json::to_value(self.tools.conversations())?)
    }

    fn metadata(&self) -> Option<ToolInfo> {
        Some(ToolInfo::new(
            names::CONVERSATIONS,
            Some("List all active conversation IDs and their message counts.".to_string()),
            empty_schema(),
        ))
    }
}
