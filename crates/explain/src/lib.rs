//! # RepoLens Explain
//!
//! Turns analysis context into prompts and streams model output back.
//!
//! ```text
//! ExplainRequest ─> prompt ─> Gemini model 1 ─> … ─> Gemini model N ─> OpenAI ─> synthetic
//!                                 (first provider that starts streaming wins)
//! ```
//!
//! A provider that refuses up front hands over to the next one. Once a
//! stream has started, a failure cannot switch providers any more; it ends
//! the stream with an `[Error streaming from …]` marker instead.

mod config;
mod error;
mod explainer;
mod gemini;
mod openai;
mod prompts;
mod provider;
mod sse;
mod synthetic;

pub use config::ExplainConfig;
pub use error::{ExplainError, Result};
pub use explainer::Explainer;
pub use gemini::{GeminiProvider, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODELS};
pub use openai::{OpenAiProvider, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL, OPENAI_KEY_PREFIX};
pub use prompts::{
    architecture_prompt, build_prompt, file_prompt, folder_prompt, FILE_PROMPT_LIMIT,
    README_PROMPT_LIMIT, TREE_CHILDREN_LIMIT,
};
pub use provider::{ExplanationStream, ModelProvider, TextStream};
pub use sse::SseDecoder;
pub use synthetic::{SyntheticProvider, DEFAULT_MOCK_CHUNK_DELAY, DEFAULT_MOCK_CHUNK_SIZE};
