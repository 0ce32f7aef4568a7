//! Startup configuration.
//!
//! Read once from command-line flags with environment fallbacks, validated
//! into a [`ServerConfig`], and never re-read afterwards.

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::error::{CodexError, Result};
use crate::store::RetentionPolicy;

/// Default chat-completions endpoint base.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Model used when a request leaves `model` empty.
pub const DEFAULT_MODEL: &str = "gpt-4.1";

/// Instruction seeded into every new conversation.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are Codex, a helpful coding assistant. Provide concise, practical advice.";

/// Which backend answers prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// OpenAI-compatible chat-completions API (supports conversations).
    Api,
    /// The `codex` command-line tool (no conversations).
    Cli,
}

/// Command-line interface of the `codex-mcp` binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "codex-mcp")]
#[command(about = "Ask OpenAI/Codex models for opinions over MCP (stdio)", long_about = None)]
#[command(version)]
pub struct Args {
    /// Backend used to answer prompts
    #[arg(long, env = "CODEX_BACKEND", value_enum, default_value = "api")]
    pub backend: BackendKind,

    /// Base URL of the chat-completions API
    #[arg(long, env = "OPENAI_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// API key for the chat-completions API
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Default model when a tool call leaves `model` empty
    #[arg(long, env = "CODEX_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// System instruction for new conversations
    #[arg(long, env = "CODEX_SYSTEM_PROMPT", default_value = DEFAULT_SYSTEM_PROMPT)]
    pub system_prompt: String,

    /// Sampling temperature sent to the API
    #[arg(long, env = "CODEX_TEMPERATURE", default_value_t = 0.7)]
    pub temperature: f32,

    /// HTTP request timeout in seconds
    #[arg(long, env = "CODEX_REQUEST_TIMEOUT_SECS", default_value_t = 600)]
    pub request_timeout_secs: u64,

    /// Name or path of the codex executable (cli backend)
    #[arg(long, env = "CODEX_BIN", default_value = "codex")]
    pub codex_bin: String,

    /// Keep at most this many finished tasks (default: keep all)
    #[arg(long, env = "CODEX_MAX_FINISHED_TASKS")]
    pub max_finished_tasks: Option<usize>,

    /// Keep at most this many conversations (default: keep all)
    #[arg(long, env = "CODEX_MAX_CONVERSATIONS")]
    pub max_conversations: Option<usize>,
}

/// Settings for [`ChatCompletionsInvoker`](crate::backend::ChatCompletionsInvoker).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    /// Endpoint base, e.g. `https://api.openai.com/v1`.
    pub api_base: String,
    /// Bearer credential.
    pub api_key: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

/// Backend selection with its settings.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendConfig {
    /// HTTP chat-completions backend.
    Api(ApiSettings),
    /// `codex` executable, by name or path.
    Cli {
        /// Name looked up on `PATH`, or a path.
        program: String,
    },
}

/// Validated server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Backend and its settings.
    pub backend: BackendConfig,
    /// Model used when a request omits one.
    pub default_model: String,
    /// Instruction seeded into new conversations.
    pub system_prompt: String,
    /// Optional store bounds.
    pub retention: RetentionPolicy,
}

impl Args {
    /// Validates the arguments into a [`ServerConfig`].
    ///
    /// The API backend requires a non-empty key.
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use codex_mcp::config::Args;
    ///
    /// let args = Args::try_parse_from(["codex-mcp", "--backend", "cli", "--model", "o3"]).unwrap();
    /// let config = args.into_config().unwrap();
    /// assert_eq!(config.default_model, "o3");
    /// ```
    pub fn into_config(self) -> Result<ServerConfig> {
        let backend = match self.backend {
            BackendKind::Api => {
                let api_key = self
                    .api_key
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| {
                        CodexError::ConfigurationMissing(
                            "OPENAI_API_KEY is not set (required by the api backend)".to_string(),
                        )
                    })?;
                BackendConfig::Api(ApiSettings {
                    api_base: self.api_base,
                    api_key,
                    temperature: self.temperature,
                    request_timeout: Duration::from_secs(self.request_timeout_secs),
                })
            }
            BackendKind::Cli => BackendConfig::Cli {
                program: self.codex_bin,
            },
        };

        let default_model = if self.model.trim().is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            self.model
        };

        Ok(ServerConfig {
            backend,
            default_model,
            system_prompt: self.system_prompt,
            retention: RetentionPolicy {
                max_finished_tasks: self.max_finished_tasks,
                max_conversations: self.max_conversations,
            },
        })
    }
}
