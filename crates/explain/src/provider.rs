use crate::error::Result;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Text fragments as they arrive from a model. An `Err` item ends the stream.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Stream that never fails; errors have already been rendered into the text.
pub type ExplanationStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// One entry in the fallback chain.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Label used in logs and in the mid-stream error marker.
    fn name(&self) -> &str;

    /// Start generating. Failing here lets the chain move on to the next
    /// provider; failing after the stream has started does not.
    async fn attempt(&self, prompt: &str) -> Result<TextStream>;
}
