pub mod client;
pub mod types;

pub use client::GroqClient;
pub use types::*;

use async_trait::async_trait;
use laponia_models::ChatError;

/// Anything that can turn a list of chat messages into a single reply.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ChatError>;
}
