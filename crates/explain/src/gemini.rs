use crate::error::{ExplainError, Result};
use crate::provider::{ModelProvider, TextStream};
use crate::sse::event_stream;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Models tried in order until one accepts the request.
pub const DEFAULT_GEMINI_MODELS: &[&str] = &[
    "gemini-2.0-flash",
    "gemini-1.5-flash",
    "gemini-1.5-flash-001",
    "gemini-1.5-pro",
    "gemini-pro",
];

/// A single Gemini model behind the streaming `generateContent` endpoint.
pub struct GeminiProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    fn name(&self) -> &str {
        &self.model
    }

    async fn attempt(&self, prompt: &str) -> Result<TextStream> {
        log::info!("Attempting Gemini model: {}", self.model);
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
        });

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
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
struct StreamEvent {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

fn decode_event(payload: &str) -> Result<Option<String>> {
    let event: StreamEvent = serde_json::from_str(payload)?;
    if let Some(error) = event.error {
        return Err(ExplainError::Status {
            status: error.code,
            body: error.message,
        });
    }

    let text: String = event
        .candidates
        .iter()
        .filter_map(|c| c.content.as_ref())
        .flat_map(|c| c.parts.iter())
        .filter_map(|p| p.text.as_deref())
        .collect();
    Ok((!text.is_empty()).then_some(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_candidate_parts() {
        let payload = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hel"},{"text":"lo"}]}}]}"#;
        assert_eq!(decode_event(payload).unwrap().as_deref(), Some("Hello"));
    }

    #[test]
    fn empty_candidates_are_skipped() {
        assert_eq!(decode_event(r#"{"candidates":[]}"#).unwrap(), None);
        assert_eq!(decode_event(r#"{"usageMetadata":{}}"#).unwrap(), None);
    }

    #[test]
    fn error_event_fails_the_stream() {
        let err = decode_event(r#"{"error":{"code":429,"message":"quota"}}"#).unwrap_err();
        assert!(matches!(err, ExplainError::Status { status: 429, .. }));
        assert!(decode_event("not json").is_err());
    }
}
