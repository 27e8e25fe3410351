pub mod chat;
pub mod cli;
pub mod relay;
pub mod speech;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum SayError {
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Invalid video id: {0}")]
    InvalidVideoId(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Live chat unavailable: {0}")]
    ChatUnavailable(String),

    #[error("Chat parse error: {0}")]
    ChatParse(String),

    #[error("TTS error: {0}")]
    Tts(String),

    #[error("IO error: {0}")]
    IO(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for SayError {
    fn from(e: std::io::Error) -> Self {
        SayError::IO(e.to_string())
    }
}

impl From<reqwest::Error> for SayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SayError::ChatParse(e.to_string())
        } else {
            SayError::Http(e.to_string())
        }
    }
}

impl From<serde_json::Error> for SayError {
    fn from(e: serde_json::Error) -> Self {
        SayError::ChatParse(e.to_string())
    }
}

impl SayError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            SayError::Usage(_) => false,
            SayError::InvalidVideoId(_) => false,
            // Network hiccups usually clear up on the next poll
            SayError::Http(_) => true,
            SayError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            SayError::ChatUnavailable(_) => false,
            SayError::ChatParse(_) => true,
            SayError::Tts(_) => false,
            SayError::IO(_) => false,
            SayError::Config(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            SayError::Usage(_) => "Missing or invalid command-line arguments.".to_string(),
            SayError::InvalidVideoId(_) => {
                "That does not look like a YouTube video id or URL.".to_string()
            }
            SayError::Http(_) => {
                "Could not reach YouTube. Please check your connection.".to_string()
            }
            SayError::HttpStatus { .. } => "YouTube rejected the request.".to_string(),
            SayError::ChatUnavailable(_) => {
                "Live chat is not available. Is the stream live with chat enabled?".to_string()
            }
            SayError::ChatParse(_) => "Received an unexpected chat response.".to_string(),
            SayError::Tts(_) => {
                "Text-to-speech failed. Please check the speech command is installed.".to_string()
            }
            SayError::IO(_) => "File system error occurred.".to_string(),
            SayError::Config(_) => "Configuration error. Please check settings.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SayError>;
