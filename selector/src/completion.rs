//! Question answering over context documents via an OpenAI-compatible
//! chat completions endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

/// Environment variable holding the completion API key.
pub const API_KEY_ENV: &str = "OPENAI_KEY";

const SYSTEM_TEMPLATE: &str = "Use the following pieces of context to answer the user's question. \n\
If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\
----------------\n";

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("missing API key environment variable: {0}")]
    MissingApiKey(String),
    #[error("completion request failed: {0}")]
    Request(String),
    #[error("completion endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion response parse failed: {0}")]
    Parse(String),
}

/// Answers a question using only the supplied context documents.
#[async_trait]
pub trait CompletionEngine: Send + Sync {
    async fn answer(&self, question: &str, context: &[String]) -> Result<String, CompletionError>;
}

/// Build the chat messages for a "stuff everything into one prompt" QA call.
pub fn build_messages(question: &str, context: &[String]) -> Value {
    let system = format!("{SYSTEM_TEMPLATE}{}", context.join("\n\n"));
    json!([
        { "role": "system", "content": system },
        { "role": "user", "content": question },
    ])
}

#[derive(Debug, Clone)]
pub struct OpenAiCompletion {
    http: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
    api_key_env: String,
}

impl OpenAiCompletion {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CompletionError::Request(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature,
            api_key_env: API_KEY_ENV.to_string(),
        })
    }

    /// Read the key from a different environment variable.
    pub fn with_api_key_env(mut self, name: impl Into<String>) -> Self {
        self.api_key_env = name.into();
        self
    }
}

#[async_trait]
impl CompletionEngine for OpenAiCompletion {
    async fn answer(&self, question: &str, context: &[String]) -> Result<String, CompletionError> {
        let api_key = std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| CompletionError::MissingApiKey(self.api_key_env.clone()))?;

        let body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": build_messages(question, context),
        });

        let started = tokio::time::Instant::now();
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| CompletionError::Parse(e.to_string()))?;
        let answer = extract_answer(&payload)?;

        tracing::info!(
            model = %self.model,
            context_documents = context.len(),
            latency_ms = elapsed_ms(started.elapsed()),
            "Completion finished"
        );
        Ok(answer)
    }
}

/// Pull `choices[0].message.content` out of a chat completions payload.
pub fn extract_answer(payload: &Value) -> Result<String, CompletionError> {
    payload
        .get("choices")
        .and_then(|v| v.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .map(ToString::to_string)
        .ok_or_else(|| CompletionError::Parse("missing choices[0].message.content".to_string()))
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
