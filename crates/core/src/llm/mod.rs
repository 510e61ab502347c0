pub mod anthropic;
pub mod json;

use crate::error::AnalyzeError;

/// A single-turn text completion against an upstream model.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Sends `prompt` as the only user message and returns the generated text.
    async fn complete(&self, prompt: &str) -> Result<String, AnalyzeError>;
}
