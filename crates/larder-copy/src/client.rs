//! Chat-completion collaborator used for copy generation.

use std::future::Future;
use std::time::Duration;

use serde_json::{json, Value};

use crate::error::CopyError;

/// Sampling temperature for product copy.
const TEMPERATURE: f64 = 0.4;
const MAX_TOKENS: u32 = 1200;

/// Something that turns a system prompt and a user message into text.
pub trait CompletionClient: Send + Sync {
    fn complete(
        &self,
        system: &str,
        user: &str,
    ) -> impl Future<Output = Result<String, CopyError>> + Send;
}

/// OpenAI-compatible `/chat/completions` client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    /// # Errors
    ///
    /// Returns [`CopyError::MissingApiKey`] for a blank key and
    /// [`CopyError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, CopyError> {
        if api_key.trim().is_empty() {
            return Err(CopyError::MissingApiKey);
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.trim().to_owned(),
            model: model.to_owned(),
        })
    }
}

fn message_content(body: &Value) -> Option<&str> {
    body.get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))
        .and_then(Value::as_str)
}

impl CompletionClient for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, CopyError> {
        let req_body = json!({
            "model": self.model,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS
        });

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&req_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CopyError::UnexpectedStatus {
                status: status.as_u16(),
                body: body.chars().take(300).collect(),
            });
        }

        let body: Value = response.json().await?;
        match message_content(&body) {
            Some(content) if !content.trim().is_empty() => Ok(content.to_owned()),
            _ => Err(CopyError::EmptyResponse),
        }
    }
}
