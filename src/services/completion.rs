use std::cell::RefCell;

use async_trait::async_trait;
use futures_util::future::{AbortRegistration, Abortable};
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{ChatError, Result};
use crate::models::{ChatMessage, ChatRequest, ChatResponse, CompletionErrorResponse, Settings};

const BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const MAX_TOKENS: u32 = 500;
pub const TEMPERATURE: f32 = 0.7;
pub const MISSING_API_KEY: &str = "OpenAI API key is not set";

#[async_trait(?Send)]
pub trait CompletionBackend {
    /// Re-reads API key and model.
    fn configure(&self, settings: &Settings);

    /// Returns the top choice's text. Fails with `ChatError::Cancelled` once
    /// the handle paired with `abort` has been aborted.
    async fn complete(&self, messages: &[ChatMessage], abort: AbortRegistration) -> Result<String>;
}

#[derive(Clone, Default)]
struct CompletionConfig {
    api_key: String,
    model: String,
}

pub struct CompletionClient {
    client: Client,
    config: RefCell<CompletionConfig>,
}

impl CompletionClient {
    pub fn new(settings: &Settings) -> Self {
        let client = Self {
            client: Client::new(),
            config: RefCell::new(CompletionConfig::default()),
        };
        client.configure(settings);
        client
    }

    async fn send(&self, config: CompletionConfig, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatRequest {
            model: &config.model,
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };
        debug!(model = %config.model, messages = messages.len(), "completion request");

        let resp = self
            .client
            .post(BASE_URL)
            .bearer_auth(&config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(map_http_error(status.as_u16(), &body));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        if let Some(usage) = parsed.usage {
            debug!(
                prompt = usage.prompt_tokens,
                completion = usage.completion_tokens,
                total = usage.total_tokens,
                "completion usage"
            );
        }
        extract_text_response(parsed)
    }
}

#[async_trait(?Send)]
impl CompletionBackend for CompletionClient {
    fn configure(&self, settings: &Settings) {
        *self.config.borrow_mut() = CompletionConfig {
            api_key: settings.api_key.trim().to_string(),
            model: settings.model.clone(),
        };
    }

    async fn complete(&self, messages: &[ChatMessage], abort: AbortRegistration) -> Result<String> {
        let config = self.config.borrow().clone();
        if config.api_key.is_empty() {
            return Err(ChatError::Configuration(MISSING_API_KEY.to_string()));
        }

        // Dropping the inner future on abort also drops the underlying fetch.
        Abortable::new(self.send(config, messages), abort)
            .await
            .map_err(|_| ChatError::Cancelled)?
    }
}

fn extract_text_response(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| ChatError::Decode("completion API returned no choices".to_string()))
}

pub(crate) fn map_http_error(status: u16, body: &str) -> ChatError {
    let message = match serde_json::from_str::<CompletionErrorResponse>(body) {
        Ok(wrapper) => {
            debug!(kind = ?wrapper.error.kind, code = ?wrapper.error.code, "completion API error");
            wrapper.error.message
        }
        Err(_) if body.trim().is_empty() => format!("Completion API returned HTTP {}", status),
        Err(_) => body.trim().to_string(),
    };
    warn!(status, %message, "completion request failed");
    ChatError::Upstream { status, message }
}
