use crate::error::Result;
use crate::provider::{ExplanationStream, ModelProvider, TextStream};
use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use std::time::Duration;

pub const DEFAULT_MOCK_CHUNK_SIZE: usize = 5;
pub const DEFAULT_MOCK_CHUNK_DELAY: Duration = Duration::from_millis(10);

/// Last link of the chain. Always produces text.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    chunk_size: usize,
    chunk_delay: Duration,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new(DEFAULT_MOCK_CHUNK_SIZE, DEFAULT_MOCK_CHUNK_DELAY)
    }
}

impl SyntheticProvider {
    #[must_use]
    pub fn new(chunk_size: usize, chunk_delay: Duration) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_delay,
        }
    }

    /// Placeholder explanation, paced like a real model.
    #[must_use]
    pub fn mock(&self, prompt: &str) -> ExplanationStream {
        log::info!("Using mock response (no usable model provider configured)");
        let chars: Vec<char> = mock_message(prompt).chars().collect();
        let chunk_size = self.chunk_size;
        let delay = self.chunk_delay;

        Box::pin(stream! {
            for (index, chunk) in chars.chunks(chunk_size).enumerate() {
                if index > 0 && !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                yield chunk.iter().collect::<String>();
            }
        })
    }

    /// Report of why no provider could answer, emitted in one piece.
    #[must_use]
    pub fn error_report(&self, detail: &str) -> ExplanationStream {
        let message = error_message(detail);
        Box::pin(futures::stream::once(async move { message }))
    }
}

#[async_trait]
impl ModelProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    /// Never refuses.
    async fn attempt(&self, prompt: &str) -> Result<TextStream> {
        Ok(Box::pin(self.mock(prompt).map(Ok)))
    }
}

fn mock_message(prompt: &str) -> String {
    let excerpt: String = prompt.chars().take(50).collect();
    format!(
        "\n# Analysis of Code (Mock Mode)\n\n\
         It seems no valid model API key (Gemini or OpenAI) is configured.\n\n\
         ### How to Enable AI:\n\
         1. **Gemini**: Set `GOOGLE_GENERATIVE_AI_API_KEY` or `explain.gemini_api_key` in the config file.\n\
         2. **OpenAI**: Set `OPENAI_API_KEY` (a key starting with `sk-`) or `explain.openai_api_key`.\n\n\
         ---\n\n\
         Here is a simulated explanation based on your request:\n\
         **Prompt received:** \"{excerpt}...\"\n\n\
         The code appears to be a modern TypeScript/JavaScript setup.\n\
         - Structure suggests Next.js or similar metadata.\n\
         - Clean code usage.\n\n\
         To get a real analysis, please configure the API keys.\n"
    )
}

fn error_message(detail: &str) -> String {
    format!(
        "\n# Model Provider Error\n\n\
         Unable to generate explanation.\n\
         **Error Details:** {detail}\n\n\
         **Troubleshooting:**\n\
         1. Check if `gemini-2.0-flash` or `gemini-1.5-flash` are enabled in your Google Cloud Project.\n\
         2. If you see \"429\", your free quota is exhausted.\n\
         3. Verify the API keys in your environment or config file.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn mock_is_chunked_by_five_characters() {
        let provider = SyntheticProvider::new(5, Duration::ZERO);
        let chunks: Vec<String> = provider.mock("Explain this repository please").collect().await;

        assert!(chunks.len() > 1);
        assert!(chunks[..chunks.len() - 1].iter().all(|c| c.chars().count() == 5));
        let text = chunks.concat();
        assert!(text.contains("Mock Mode"));
        assert!(text.contains("**Prompt received:** \"Explain this repository please...\""));
    }

    #[tokio::test]
    async fn attempt_always_streams_the_mock() {
        let provider: Box<dyn ModelProvider> = Box::new(SyntheticProvider::new(5, Duration::ZERO));
        assert_eq!(provider.name(), "synthetic");

        let chunks: Vec<String> = provider
            .attempt("any prompt")
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert!(chunks.iter().all(|c| c.chars().count() <= 5));
        assert!(chunks.concat().contains("**Prompt received:** \"any prompt...\""));
    }

    #[tokio::test]
    async fn error_report_is_a_single_chunk() {
        let chunks: Vec<String> = SyntheticProvider::default()
            .error_report("API Error 403: forbidden")
            .collect()
            .await;
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].contains("**Error Details:** API Error 403: forbidden"));
    }
}
