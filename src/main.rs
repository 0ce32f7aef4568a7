//! codex-mcp: ask OpenAI/Codex models for opinions over MCP (stdio).
//!
//! Configuration is read once from flags and environment variables; see
//! `codex-mcp --help`. Logs go to stderr because stdout carries the protocol.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use codex_mcp::backend::{BackendInvoker, ChatCompletionsInvoker, CodexCliInvoker};
use codex_mcp::config::{Args, BackendConfig};
use codex_mcp::server::build_server;
use codex_mcp::store::{ConversationStore, JobRegistry};
use codex_mcp::Executor;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = Args::parse().into_config()?;

    let backend: Arc<dyn BackendInvoker> = match &config.backend {
        BackendConfig::Api(settings) => {
            tracing::info!(api_base = %settings.api_base, "using chat-completions backend");
            Arc::new(ChatCompletionsInvoker::new(settings)?)
        }
        BackendConfig::Cli { program } => {
            let invoker = CodexCliInvoker::discover(program)?;
            tracing::info!(program = %invoker.program().display(), "using codex CLI backend");
            Arc::new(invoker)
        }
    };

    let tasks = Arc::new(JobRegistry::new().with_retention(config.retention));
    let conversations = Arc::new(
        ConversationStore::new(config.system_prompt.clone()).with_retention(config.retention),
    );
    let executor = Executor::new(backend, tasks, conversations, config.default_model.clone());

    let server = build_server(executor).context("failed to build MCP server")?;

    tracing::info!(model = %config.default_model, "starting codex MCP server on stdio");
    server.run_stdio().await?;

    Ok(())
}
