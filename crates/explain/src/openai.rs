use crate::error::{ExplainError, Result};
use crate::provider::{ModelProvider, TextStream};
use crate::sse::event_stream;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

const SYSTEM_PROMPT: &str = "You are an expert Senior software Architect and Engineer. Your goal is \
to explain complex codebases clearly, accurately, and educationally to developers of varying skill \
levels. Use markdown heavily for readability.";

/// Key prefix that marks a usable OpenAI secret key.
pub const OPENAI_KEY_PREFIX: &str = "sk-";

/// OpenAI chat completions with `stream: true`.
pub struct OpenAiProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiProvider {
    /// `None` unless `api_key` looks like a secret key.
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: &str,
        model: impl Into<String>,
        temperature: f32,
    ) -> Option<Self> {
        let api_key = api_key.trim();
        if !api_key.starts_with(OPENAI_KEY_PREFIX) {
            return None;
        }
        Some(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.to_string(),
            model: model.into(),
            temperature,
        })
    }
}

#[async_trait]
impl ModelProvider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.model
    }

    async fn attempt(&self, prompt: &str) -> Result<TextStream> {
        log::info!("Attempting OpenAI model: {}", self.model);
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt }
            ],
            "stream": true,
            "temperature": self.temperature,
        });

        let response = self
            .http
            .post(format!(
                "{}/v1/chat/completions",
                self.base_url.trim_end_matches('/')
            ))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExplainError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(event_stream(response, decode_event))
    }
}

#[derive(Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    delta: Option<Delta>,
}

#[derive(Deserialize)]
struct Delta {
    content: Option<String>,
}

/// Unparseable events are logged and skipped.
fn decode_event(payload: &str) -> Result<Option<String>> {
    if payload.trim() == "[DONE]" {
        return Ok(None);
    }
    match serde_json::from_str::<ChatChunk>(payload) {
        Ok(chunk) => Ok(chunk
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.delta)
            .and_then(|d| d.content)
            .filter(|text| !text.is_empty())),
        Err(err) => {
            log::warn!("Error parsing stream event: {err}");
            Ok(None)
        }
    }
}
