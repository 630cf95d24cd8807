use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{LlmProvider, Message};

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiProvider {
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Turn<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Turn<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, base_url: String, model: String, max_tokens: u32) -> Self {
        Self {
            api_key,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model,
            max_tokens,
            client: reqwest::Client::new(),
        }
    }

    fn request<'a>(&'a self, system_prompt: &'a str, messages: &'a [Message]) -> CompletionRequest<'a> {
        let system = Turn {
            role: "system",
            content: system_prompt,
        };
        let turns = messages.iter().map(|m| Turn {
            role: &m.role,
            content: &m.content,
        });
        CompletionRequest {
            model: &self.model,
            messages: std::iter::once(system).chain(turns).collect(),
            max_tokens: self.max_tokens,
        }
    }
}

/// The first choice's text; a reply without one is an error, not an empty answer.
fn first_reply(body: &str) -> anyhow::Result<String> {
    let parsed: CompletionResponse =
        serde_json::from_str(body).context("completion response is not valid JSON")?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| anyhow!("completion response has no message content"))
}

/// Prefers the provider's own `error.message` over the raw body.
fn failure_detail(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string())
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String> {
        anyhow::ensure!(!self.api_key.is_empty(), "OPENAI_API_KEY is not set");

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request(system_prompt, messages))
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.endpoint))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .context("failed to read completion response")?;

        if !status.is_success() {
            return Err(anyhow!(
                "completion request rejected with {status}: {}",
                failure_detail(&body)
            ));
        }

        first_reply(&body)
    }
}
