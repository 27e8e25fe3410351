//! Configuration for the relay loop

use crate::speech::SpeechConfig;
use crate::Result;
use std::time::Duration;

/// Pause between polls of the chat source
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Configuration for the complete relay
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Delay after each batch before polling again
    pub poll_interval: Duration,

    /// Speech output configuration
    pub speech: SpeechConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            speech: SpeechConfig::default(),
        }
    }
}

impl RelayConfig {
    /// Create a configuration with speech settings detected for this machine
    pub fn detect() -> Self {
        Self {
            speech: SpeechConfig::detect(),
            ..Default::default()
        }
    }

    /// Set the speech configuration
    pub fn with_speech(mut self, speech: SpeechConfig) -> Self {
        self.speech = speech;
        self
    }

    /// Set the delay between polls
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.speech.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.speech.voice, "Samantha");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = RelayConfig::default()
            .with_poll_interval(Duration::ZERO)
            .with_speech(SpeechConfig::default().with_voice("Alex"));

        assert!(config.poll_interval.is_zero());
        assert_eq!(config.speech.voice, "Alex");
    }
}
