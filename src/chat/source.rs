use super::types::ChatMessage;
use crate::Result;
use async_trait::async_trait;

/// An open chat session for one stream
///
/// `fetch_batch` returns the messages received since the previous call, in
/// arrival order. It may wait for the server before returning and may
/// return an empty batch.
#[async_trait]
pub trait ChatSource: Send {
    /// Whether the stream is still live and worth polling
    fn is_alive(&self) -> bool;

    /// Fetch the next batch of messages
    async fn fetch_batch(&mut self) -> Result<Vec<ChatMessage>>;
}
