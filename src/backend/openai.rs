//! Chat-completions backend over HTTP.
//!
//! Sends the full conversation to `{api_base}/chat/completions` and returns
//! the first choice's content. Works against OpenAI and Azure OpenAI; for
//! Azure endpoints the key is also sent in the `api-key` header.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{BackendError, BackendInvoker, InvokeRequest};
use crate::config::ApiSettings;
use crate::error::{CodexError, Result};
use crate::types::Message;

/// Request body for the chat-completions endpoint.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Conversation-aware invoker for OpenAI-compatible chat APIs.
#[derive(Debug, Clone)]
pub struct ChatCompletionsInvoker {
    client: Client,
    api_base: String,
    api_key: String,
    temperature: f32,
    azure: bool,
}

impl ChatCompletionsInvoker {
    /// Builds the invoker and its HTTP client.
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| {
                CodexError::ConfigurationMissing(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            temperature: settings.temperature,
            azure: settings.api_base.to_lowercase().contains("azure"),
        })
    }

    /// Returns `true` when requests carry the Azure `api-key` header.
    pub fn is_azure(&self) -> bool {
        self.azure
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

#[async_trait]
impl BackendInvoker for ChatCompletionsInvoker {
    async fn invoke(&self, request: InvokeRequest) -> std::result::Result<String, BackendError> {
        let single_turn;
        let messages: &[Message] = match &request.history {
            Some(history) => history,
            None => {
                single_turn = [Message::user(request.prompt.clone())];
                &single_turn
            }
        };

        let body = ChatCompletionRequest {
            model: &request.model,
            messages,
            temperature: self.temperature,
        };

        let mut builder = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body);
        if self.azure {
            builder = builder.header("api-key", &self.api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Transport(format!("invalid response body: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(BackendError::EmptyResponse)
    }

    fn supports_history(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "chat-completions"
    }
}
