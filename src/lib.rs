//! MCP server that lets clients ask OpenAI/Codex models for opinions.
//!
//! Prompts can be answered synchronously (`codex_exec`) or submitted as
//! background tasks (`codex_async`) that are polled later (`codex_poll`,
//! `codex_list_tasks`). With a conversation-aware backend, replies carry a
//! `conversation_id` that threads multi-turn context through otherwise
//! stateless calls (`codex_conversations` lists them).
//!
//! # Module Organization
//!
//! - [`types`] - Task and conversation domain types
//! - [`store`] - In-memory job registry and conversation store
//! - [`backend`] - The [`BackendInvoker`] seam and its HTTP and CLI implementations
//! - [`executor`] - Synchronous and detached execution paths
//! - [`server`] - Tool façade and MCP server assembly
//! - [`config`] - Command-line and environment configuration
//! - [`error`] - Error taxonomy
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use codex_mcp::backend::CodexCliInvoker;
//! use codex_mcp::store::{ConversationStore, JobRegistry};
//! use codex_mcp::Executor;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let backend = Arc::new(CodexCliInvoker::discover("codex")?);
//! let executor = Executor::new(
//!     backend,
//!     Arc::new(JobRegistry::new()),
//!     Arc::new(ConversationStore::new("You are Codex.")),
//!     "gpt-4.1",
//! );
//! let server = codex_mcp::server::build_server(executor)?;
//! server.run_stdio().await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod executor;
pub mod server;
pub mod store;
pub mod types;

pub use backend::{BackendError, BackendInvoker, InvokeRequest};
pub use error::{CodexError, Result};
pub use executor::{Execution, Executor, Submitted};
pub use types::{ConversationSummary, Message, Role, TaskRecord, TaskStatus, TaskSummary};
