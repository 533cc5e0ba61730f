use async_trait::async_trait;

use crate::types::CompletionError;

/// Narrow seam over the external chat-completion service: one prompt in,
/// one answer out. Concrete providers are swappable behind this trait
/// without touching the interaction layer.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}
