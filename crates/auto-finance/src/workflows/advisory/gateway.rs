use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("text service unreachable: {0}")]
    Transport(String),
    #[error("text service returned HTTP {0}")]
    Status(u16),
    #[error("text service returned an unreadable body: {0}")]
    Malformed(String),
    #[error("text service returned no text")]
    Empty,
    #[error("text service did not answer in time")]
    Timeout,
}

/// Remote generative-text service.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    result: Option<Value>,
}

/// Pulls the generated text out of a completion body: `choices[0].text`, then
/// `result`. Blank text counts as no text.
pub fn extract_text(body: &str) -> Result<String, CompletionError> {
    let parsed: CompletionResponse = serde_json::from_str(body)
        .map_err(|err| CompletionError::Malformed(err.to_string()))?;

    let from_choices = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.text)
        .filter(|text| !text.trim().is_empty());

    let from_result = || match parsed.result {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text),
        _ => None,
    };

    from_choices
        .or_else(from_result)
        .ok_or(CompletionError::Empty)
}

/// Bearer-authenticated completion client.
#[derive(Clone)]
pub struct HttpCompletionClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpCompletionClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint, api_key)
    }

    pub fn with_client(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Debug for HttpCompletionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpCompletionClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CompletionGateway for HttpCompletionClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, CompletionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&CompletionRequest { prompt, max_tokens })
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    CompletionError::Timeout
                } else {
                    CompletionError::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CompletionError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|err| CompletionError::Transport(err.to_string()))?;
        extract_text(&body)
    }
}
