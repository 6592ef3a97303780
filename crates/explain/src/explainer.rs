use crate::config::ExplainConfig;
use crate::error::{ExplainError, Result};
use crate::gemini::GeminiProvider;
use crate::openai::OpenAiProvider;
use crate::prompts::build_prompt;
use crate::provider::{ExplanationStream, ModelProvider, TextStream};
use crate::synthetic::SyntheticProvider;
use async_stream::stream;
use futures::StreamExt;
use repolens_protocol::ExplainRequest;
use std::time::Duration;

/// Ordered provider chain ending in the synthetic provider.
pub struct Explainer {
    providers: Vec<Box<dyn ModelProvider>>,
    synthetic: SyntheticProvider,
}

impl Explainer {
    pub fn new(providers: Vec<Box<dyn ModelProvider>>, synthetic: SyntheticProvider) -> Self {
        Self {
            providers,
            synthetic,
        }
    }

    /// Gemini models first (when a key is set), then OpenAI (when the key
    /// is an `sk-` key).
    pub fn from_config(config: &ExplainConfig) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        let mut providers: Vec<Box<dyn ModelProvider>> = Vec::new();

        if let Some(key) = non_blank(config.gemini_api_key.as_deref()) {
            for model in &config.gemini_models {
                providers.push(Box::new(GeminiProvider::new(
                    http.clone(),
                    config.gemini_base_url.clone(),
                    key,
                    model.clone(),
                )));
            }
        }

        if let Some(key) = non_blank(config.openai_api_key.as_deref()) {
            match OpenAiProvider::new(
                http,
                config.openai_base_url.clone(),
                key,
                config.openai_model.clone(),
                config.temperature,
            ) {
                Some(provider) => providers.push(Box::new(provider)),
                None => log::debug!("Ignoring OpenAI key without the sk- prefix"),
            }
        }

        let synthetic = SyntheticProvider::new(
            config.mock_chunk_size,
            Duration::from_millis(config.mock_chunk_delay_ms),
        );
        Ok(Self::new(providers, synthetic))
    }

    #[must_use]
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Build the prompt for a request body and stream its explanation.
    pub async fn explain(&self, request: &ExplainRequest) -> Result<ExplanationStream> {
        let target = request
            .target()
            .map_err(|err| ExplainError::InvalidContext(err.to_string()))?;
        let prompt = build_prompt(&target, request.level);
        Ok(self.stream(&prompt).await)
    }

    /// Try each provider until one starts streaming. Never fails: when every
    /// provider refuses, the synthetic provider answers instead.
    pub async fn stream(&self, prompt: &str) -> ExplanationStream {
        let mut last_error: Option<ExplainError> = None;

        for provider in &self.providers {
            match provider.attempt(prompt).await {
                Ok(stream) => return guard_stream(provider.name().to_string(), stream),
                Err(err) => {
                    log::warn!("Failed model {}: {err}", provider.name());
                    last_error = Some(err);
                }
            }
        }

        if let Some(err) = last_error {
            log::error!("All model providers failed: {err}");
            return self.synthetic.error_report(&err.to_string());
        }

        let fallback: &dyn ModelProvider = &self.synthetic;
        match fallback.attempt(prompt).await {
            Ok(stream) => guard_stream(fallback.name().to_string(), stream),
            Err(err) => self.synthetic.error_report(&err.to_string()),
        }
    }
}

/// Pass text through; a mid-stream error becomes a trailing marker.
fn guard_stream(name: String, mut inner: TextStream) -> ExplanationStream {
    Box::pin(stream! {
        while let Some(item) = inner.next().await {
            match item {
                Ok(text) => {
                    yield text;
                }
                Err(err) => {
                    log::error!("Stream error on {name}: {err}");
                    yield format!("\n\n[Error streaming from {name}]\n");
                    break;
                }
            }
        }
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::stream;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    enum Behavior {
        Refuse,
        Stream(Vec<&'static str>),
        BreakAfter(Vec<&'static str>),
    }

    struct Scripted {
        name: &'static str,
        behavior: Behavior,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ModelProvider for Scripted {
        fn name(&self) -> &str {
            self.name
        }

        async fn attempt(&self, _prompt: &str) -> Result<TextStream> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                Behavior::Refuse => Err(ExplainError::Status {
                    status: 404,
                    body: "model not found".to_string(),
                }),
                Behavior::Stream(parts) => {
                    let items: Vec<Result<String>> =
                        parts.iter().map(|p| Ok((*p).to_string())).collect();
                    Ok(Box::pin(stream::iter(items)))
                }
                Behavior::BreakAfter(parts) => {
                    let mut items: Vec<Result<String>> =
                        parts.iter().map(|p| Ok((*p).to_string())).collect();
                    items.push(Err(ExplainError::InvalidContext("connection reset".into())));
                    items.push(Ok("never seen".to_string()));
                    Ok(Box::pin(stream::iter(items)))
                }
            }
        }
    }

    fn scripted(name: &'static str, behavior: Behavior, calls: &Arc<AtomicUsize>) -> Box<dyn ModelProvider> {
        Box::new(Scripted {
            name,
            behavior,
            calls: Arc::clone(calls),
        })
    }

    fn quiet_synthetic() -> SyntheticProvider {
        SyntheticProvider::new(5, Duration::ZERO)
    }

    #[tokio::test]
    async fn falls_through_to_first_working_provider() {
        let calls = Arc::new(AtomicUsize::new(0));
        let explainer = Explainer::new(
            vec![
                scripted("a", Behavior::Refuse, &calls),
                scripted("b", Behavior::Stream(vec!["Hel", "lo"]), &calls),
                scripted("c", Behavior::Stream(vec!["unused"]), &calls),
            ],
            quiet_synthetic(),
        );

        let text: String = explainer.stream("p").await.collect::<Vec<_>>().await.concat();
        assert_eq!(text, "Hello");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn mid_stream_failure_appends_marker_and_stops() {
        let calls = Arc::new(AtomicUsize::new(0));
        let explainer = Explainer::new(
            vec![
                scripted("gemini-2.0-flash", Behavior::BreakAfter(vec!["partial"]), &calls),
                scripted("spare", Behavior::Stream(vec!["unused"]), &calls),
            ],
            quiet_synthetic(),
        );

        let chunks: Vec<String> = explainer.stream("p").await.collect().await;
        assert_eq!(
            chunks,
            vec!["partial", "\n\n[Error streaming from gemini-2.0-flash]\n"]
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn all_failures_produce_error_report() {
        let calls = Arc::new(AtomicUsize::new(0));
        let explainer = Explainer::new(
            vec![
                scripted("a", Behavior::Refuse, &calls),
                scripted("b", Behavior::Refuse, &calls),
            ],
            quiet_synthetic(),
        );

        let text: String = explainer.stream("p").await.collect::<Vec<_>>().await.concat();
        assert!(text.contains("Unable to generate explanation."));
        assert!(text.contains("API Error 404: model not found"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn no_providers_streams_mock() {
        let explainer = Explainer::new(vec![], quiet_synthetic());
        let text: String = explainer
            .stream("Explain the source code file")
            .await
            .collect::<Vec<_>>()
            .await
            .concat();
        assert!(text.contains("Mock Mode"));
    }

    #[test]
    fn config_builds_expected_chain() {
        let config = ExplainConfig {
            gemini_api_key: Some("g-key".to_string()),
            openai_api_key: Some("sk-test".to_string()),
            ..ExplainConfig::default()
        };
        let explainer = Explainer::from_config(&config).unwrap();
        assert_eq!(
            explainer.provider_names(),
            vec![
                "gemini-2.0-flash",
                "gemini-1.5-flash",
                "gemini-1.5-flash-001",
                "gemini-1.5-pro",
                "gemini-pro",
                "gpt-3.5-turbo"
            ]
        );

        let without_keys = Explainer::from_config(&ExplainConfig {
            gemini_api_key: Some("   ".to_string()),
            openai_api_key: Some("not-a-secret".to_string()),
            ..ExplainConfig::default()
        })
        .unwrap();
        assert!(without_keys.provider_names().is_empty());
    }
}
