use crate::gemini::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODELS};
use crate::openai::{DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
use crate::synthetic::{DEFAULT_MOCK_CHUNK_DELAY, DEFAULT_MOCK_CHUNK_SIZE};
use serde::Deserialize;

/// Provider settings. Every field has a default so a partial `[explain]`
/// table is enough.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExplainConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_models: Vec<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub temperature: f32,
    pub mock_chunk_size: usize,
    pub mock_chunk_delay_ms: u64,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            gemini_models: DEFAULT_GEMINI_MODELS.iter().map(|m| (*m).to_string()).collect(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            temperature: 0.2,
            mock_chunk_size: DEFAULT_MOCK_CHUNK_SIZE,
            mock_chunk_delay_ms: u64::try_from(DEFAULT_MOCK_CHUNK_DELAY.as_millis()).unwrap_or(10),
        }
    }
}
