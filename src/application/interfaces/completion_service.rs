use async_trait::async_trait;

use crate::domain::{RequestError, Turn};

/// Produces the next assistant turn for a conversation.
///
/// Implementors own transport and wire-format details. One call is one
/// request: no retries, no streaming.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send the full `transcript` and return the assistant's reply.
    async fn complete(&self, transcript: &[Turn]) -> Result<Turn, RequestError>;
}
