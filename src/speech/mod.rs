//! Speech output for chat messages
//!
//! This module provides:
//! - Friendly-name normalization for authors
//! - Utterance sanitization and filtering
//! - Speech through the operating system TTS command (`say`, `espeak-ng`)

pub mod names;
pub mod say;

// Re-export commonly used types
pub use names::friendly_name;
pub use say::{
    sanitize_for_tts, CommandSpeaker, SpeechConfig, SpeechEngine, SpeechOutput, Utterance,
    DEFAULT_VOICE, MAX_UTTERANCE_CHARS,
};
