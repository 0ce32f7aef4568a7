//! MCP server assembly.
//!
//! [`build_server`] registers the codex tools on a `pmcp` server.
//! `codex_conversations` is only registered when the backend keeps history.

pub mod tools;

use std::sync::Arc;

use pmcp::types::capabilities::ServerCapabilities;
use pmcp::Server;

use crate::executor::Executor;

pub use tools::{
    AsyncTool, CodexTools, ConversationsTool, ExecResponse, ExecTool, ListTasksTool, PollArgs,
    PollResponse, PollTool, PromptArgs, SubmitResponse, TaskView,
};

/// Name advertised during MCP initialization.
pub const SERVER_NAME: &str = "codex";

/// Builds the MCP server exposing the codex tools.
pub fn build_server(executor: Executor) -> pmcp::Result<Server> {
    let tools = Arc::new(CodexTools::new(executor));

    let mut builder = Server::builder()
        .name(SERVER_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .capabilities(ServerCapabilities::tools_only())
        .tool(tools::names::EXEC, ExecTool::new(Arc::clone(&tools)))
        .tool(tools::names::ASYNC, AsyncTool::new(Arc::clone(&tools)))
        .tool(tools::names::POLL, PollTool::new(Arc::clone(&tools)))
        .tool(tools::names::LIST_TASKS, ListTasksTool::new(Arc::clone(&tools)));

    if tools.executor().supports_conversations() {
        builder = builder.tool(
            tools::names::CONVERSATIONS,
            ConversationsTool::new(Arc::clone(&tools)),
        );
    }

    tracing::debug!(tools = ?tools.tool_names(), "registering codex tools");
    builder.build()
}
