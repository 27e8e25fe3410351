//! Polling relay loop
//!
//! Connects a chat source to a speech output: Fetch -> Print -> Speak

pub mod config;

pub use config::RelayConfig;

use crate::chat::{ChatMessage, ChatSource};
use crate::speech::{friendly_name, say::speak_text, SpeechOutput};
use crate::Result;
use std::io::Write;
use tracing::{debug, info};

/// Printed once the chat session reports it is no longer alive
pub const ENDED_BANNER: &str = "Chat ended or stream offline.";

/// Counters reported when the loop finishes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Polls made against the chat source
    pub batches: u64,

    /// Messages printed
    pub received: u64,

    /// Messages that were spoken
    pub spoken: u64,
}

/// The utterance spoken for a message
pub fn utterance_text(message: &ChatMessage) -> String {
    format!("{} says: {}", friendly_name(&message.author), message.body)
}

/// Relays every chat message to the console and the speech output
///
/// Messages are handled one at a time in arrival order; the next message
/// is not printed until the previous one has finished speaking.
pub struct RelayLoop<C, S, W> {
    source: C,
    speech: S,
    out: W,
    config: RelayConfig,
}

impl<C, S, W> RelayLoop<C, S, W>
where
    C: ChatSource,
    S: SpeechOutput,
    W: Write + Send,
{
    pub fn new(source: C, speech: S, out: W, config: RelayConfig) -> Self {
        Self {
            source,
            speech,
            out,
            config,
        }
    }

    /// Poll until the chat session ends
    pub async fn run(&mut self) -> Result<RelayStats> {
        let mut stats = RelayStats::default();

        while self.source.is_alive() {
            let batch = self.source.fetch_batch().await?;
            stats.batches += 1;
            if !batch.is_empty() {
                debug!(count = batch.len(), "Relaying chat batch");
            }

            for message in &batch {
                stats.received += 1;
                if self.relay_message(message).await? {
                    stats.spoken += 1;
                }
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }

        writeln!(self.out, "{}", ENDED_BANNER)?;
        self.out.flush()?;
        info!(
            batches = stats.batches,
            received = stats.received,
            spoken = stats.spoken,
            "Chat session ended"
        );
        Ok(stats)
    }

    /// Print and speak one message, returning whether it was spoken
    async fn relay_message(&mut self, message: &ChatMessage) -> Result<bool> {
        writeln!(self.out, "{}", message.log_line())?;
        self.out.flush()?;

        if let Some(published_at) = message.published_at {
            debug!(author = %message.author, %published_at, "Chat message");
        }

        let text = utterance_text(message);
        speak_text(&mut self.speech, &self.config.speech, &text).await
    }

    /// Give back the source, speech output and writer
    pub fn into_inner(self) -> (C, S, W) {
        (self.source, self.speech, self.out)
    }
}
