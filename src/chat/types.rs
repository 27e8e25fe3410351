use chrono::{DateTime, Utc};

/// A single comment received from a live chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Author display name, exactly as the chat reports it
    pub author: String,

    /// Message text with emoji rendered as their shortcuts
    pub body: String,

    /// When the chat server says the message was posted
    pub published_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn new(author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            body: body.into(),
            published_at: None,
        }
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    /// The line printed to the console for this message
    pub fn log_line(&self) -> String {
        format!("{}: {}", self.author, self.body)
    }
}
