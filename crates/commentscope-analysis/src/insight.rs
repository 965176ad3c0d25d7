//! Chat-completion client that turns comment text into an engagement read-out.
//!
//! Failures never propagate: a non-2xx status, a transport error, or a body
//! that is not a chat-completion payload becomes the insight text itself
//! (`Error: <status> - <body>`), so the spam ratio can still be reported.

use std::time::Duration;

use async_trait::async_trait;
use commentscope_core::{InsightSettings, PromptTemplate};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::InsightError;
use crate::retry::retry_with_backoff;
use crate::types::{InsightOutcome, InsightReport};

/// Returned without a network call when there is no comment text.
pub const NO_COMMENTS_MESSAGE: &str = "No comments found for analysis.";

/// Returned when a successful response carries no message content.
pub const NO_RESPONSE_MESSAGE: &str = "No response from AI.";

/// Produces free-form analysis text for a block of comments.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    /// Summarize newline-joined comment text. Never fails; errors are
    /// reported through the returned text and [`InsightOutcome::Failed`].
    async fn summarize(&self, text: &str) -> InsightReport;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
    }
}

/// OpenAI-compatible chat-completion client (Groq by default).
pub struct ChatCompletionClient {
    client: Client,
    settings: InsightSettings,
    prompt: PromptTemplate,
}

impl ChatCompletionClient {
    /// # Errors
    ///
    /// Returns [`InsightError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(settings: &InsightSettings, prompt: PromptTemplate) -> Result<Self, InsightError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("commentscope/0.1 (comment-analysis)")
            .build()?;
        Ok(Self {
            client,
            settings: settings.clone(),
            prompt,
        })
    }

    /// Single request with retries on transient failures.
    ///
    /// # Errors
    ///
    /// - [`InsightError::Status`] for a non-2xx response.
    /// - [`InsightError::Http`] on network failure or timeout.
    /// - [`InsightError::Malformed`] if a 2xx body is not JSON.
    pub async fn try_summarize(&self, text: &str) -> Result<String, InsightError> {
        let user = self.prompt.render_user(text);
        let request = ChatRequest {
            model: &self.settings.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        retry_with_backoff(
            self.settings.max_retries,
            self.settings.backoff_base_ms,
            || self.send(&request),
        )
        .await
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<String, InsightError> {
        let response = self
            .client
            .post(&self.settings.api_url)
            .bearer_auth(&self.settings.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(InsightError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| InsightError::Malformed(format!("{e}: {body}")))?;
        Ok(parsed
            .into_content()
            .unwrap_or_else(|| NO_RESPONSE_MESSAGE.to_string()))
    }
}

#[async_trait]
impl InsightGenerator for ChatCompletionClient {
    async fn summarize(&self, text: &str) -> InsightReport {
        if text.trim().is_empty() {
            return InsightReport {
                text: NO_COMMENTS_MESSAGE.to_string(),
                outcome: InsightOutcome::Skipped,
            };
        }

        match self.try_summarize(text).await {
            Ok(content) => InsightReport {
                text: content,
                outcome: InsightOutcome::Generated,
            },
            Err(e) => {
                tracing::warn!(model = %self.settings.model, error = %e, "insight request failed");
                InsightReport {
                    text: format!("Error: {e}"),
                    outcome: InsightOutcome::Failed,
                }
            }
        }
    }
}
