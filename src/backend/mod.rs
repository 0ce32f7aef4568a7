//! Backend invokers: the component that actually produces completions.
//!
//! The core only relies on [`BackendInvoker`]: take a prompt, a model and an
//! optional ordered history, return text or a [`BackendError`].
//!
//! - [`openai::ChatCompletionsInvoker`] -- HTTP chat-completions API,
//!   conversation-aware.
//! - [`cli::CodexCliInvoker`] -- spawns the `codex` executable, no
//!   conversation support.

pub mod cli;
pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::Message;

pub use cli::CodexCliInvoker;
pub use openai::ChatCompletionsInvoker;

/// One completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeRequest {
    /// The new user prompt.
    pub prompt: String,
    /// Resolved model identifier.
    pub model: String,
    /// Full ordered history, ending with the user turn for `prompt`.
    /// `None` for invokers without conversation support.
    pub history: Option<Vec<Message>>,
}

impl InvokeRequest {
    /// A request without history.
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            history: None,
        }
    }

    /// Attaches the conversation history.
    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = Some(history);
        self
    }
}

/// Failure of a single backend invocation. The display text is the
/// description stored on failed tasks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The request never got a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The API answered with a non-success status.
    #[error("backend returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The backend answered without any text.
    #[error("backend returned an empty response")]
    EmptyResponse,

    /// The external executable could not be started.
    #[error("failed to launch {program}: {reason}")]
    Spawn {
        /// Executable path.
        program: String,
        /// OS error text.
        reason: String,
    },

    /// The external executable exited unsuccessfully.
    #[error("{program} exited with {code}: {stderr}")]
    Exit {
        /// Executable path.
        program: String,
        /// Exit code, or `"signal"` when killed.
        code: String,
        /// Captured standard error.
        stderr: String,
    },
}

/// Performs one completion call.
///
/// Implementations must be cheap to share behind an `Arc` and safe to call
/// concurrently.
#[async_trait]
pub trait BackendInvoker: Send + Sync {
    /// Runs one completion and returns the generated text.
    async fn invoke(&self, request: InvokeRequest) -> Result<String, BackendError>;

    /// Whether this invoker consumes conversation history.
    fn supports_history(&self) -> bool;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
