//! Text-to-speech through the operating system speech command
//!
//! Utterances are sanitized (quotes removed, newlines flattened) and
//! filtered (blank or overlong text is dropped) before a command such as
//! macOS `say` is run. The command is awaited, so speech is serialized.

use crate::{Result, SayError};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Voice used by `say` when none is configured
pub const DEFAULT_VOICE: &str = "Samantha";

/// Voice used by `espeak-ng` when none is configured
pub const DEFAULT_ESPEAK_VOICE: &str = "en-us";

/// Longest utterance that will be spoken, in characters
pub const MAX_UTTERANCE_CHARS: usize = 200;

/// Native speech command used for output
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeechEngine {
    /// macOS `say -v <voice> <text>`
    Say,
    /// `espeak-ng -v <voice> <text>`
    EspeakNg,
}

impl SpeechEngine {
    /// Program name looked up on PATH
    pub fn default_program(&self) -> &'static str {
        match self {
            SpeechEngine::Say => "say",
            SpeechEngine::EspeakNg => "espeak-ng",
        }
    }

    pub fn default_voice(&self) -> &'static str {
        match self {
            SpeechEngine::Say => DEFAULT_VOICE,
            SpeechEngine::EspeakNg => DEFAULT_ESPEAK_VOICE,
        }
    }

    /// Arguments for speaking `text` with `voice`
    pub fn args(&self, voice: &str, text: &str) -> Vec<String> {
        match self {
            // `--` keeps text starting with `-` from being read as an option
            SpeechEngine::Say | SpeechEngine::EspeakNg => vec![
                "-v".to_string(),
                voice.to_string(),
                "--".to_string(),
                text.to_string(),
            ],
        }
    }
}

/// Configuration for speech output
#[derive(Clone, Debug)]
pub struct SpeechConfig {
    pub engine: SpeechEngine,

    /// Program to run (name on PATH or absolute path)
    pub program: String,

    /// Voice passed to the engine
    pub voice: String,

    /// Utterances longer than this are dropped
    pub max_chars: usize,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self::for_engine(SpeechEngine::Say)
    }
}

impl SpeechConfig {
    /// Defaults for a specific engine
    pub fn for_engine(engine: SpeechEngine) -> Self {
        Self {
            engine,
            program: engine.default_program().to_string(),
            voice: engine.default_voice().to_string(),
            max_chars: MAX_UTTERANCE_CHARS,
        }
    }

    /// Pick the native engine for this machine
    ///
    /// `say` is preferred; `espeak-ng` (or `espeak`) is used when `say` is
    /// not installed. With neither present the `say` defaults are kept and
    /// the first utterance reports the missing command.
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") || find_on_path("say").is_some() {
            return Self::for_engine(SpeechEngine::Say);
        }
        if let Some(bin) = find_on_path("espeak-ng").or_else(|| find_on_path("espeak")) {
            info!(bin = ?bin, "Detected espeak binary");
            let mut config = Self::for_engine(SpeechEngine::EspeakNg);
            config.program = bin.to_string_lossy().into_owned();
            return config;
        }
        warn!("No speech command found on PATH; falling back to `say`");
        Self::default()
    }

    /// Set the voice
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    /// Set the program to run
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the maximum utterance length
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.program.trim().is_empty() {
            return Err(SayError::Config("Speech program is required".to_string()));
        }
        if self.voice.trim().is_empty() {
            return Err(SayError::Config("Speech voice is required".to_string()));
        }
        if self.max_chars == 0 {
            return Err(SayError::Config(
                "Maximum utterance length must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn find_on_path(bin: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(bin))
        .find(|candidate| candidate.is_file())
}

/// Strip characters that could break the speech command invocation
///
/// Double and single quotes are removed; line breaks become spaces.
pub fn sanitize_for_tts(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '"' && *c != '\'')
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

/// Sanitized text ready to hand to the speech command
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Utterance {
    voice: String,
    text: String,
}

impl Utterance {
    /// Sanitize `text` and keep it only if it is worth speaking
    ///
    /// Returns `None` when the sanitized text is blank or longer than
    /// `max_chars` characters.
    pub fn new(text: &str, voice: &str, max_chars: usize) -> Option<Self> {
        let clean = sanitize_for_tts(text);
        if clean.trim().is_empty() || clean.chars().count() > max_chars {
            return None;
        }
        Some(Self {
            voice: voice.to_string(),
            text: clean,
        })
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Something that can speak utterances aloud
#[async_trait]
pub trait SpeechOutput: Send {
    /// Speak `utterance`, returning once speech has finished
    async fn speak(&mut self, utterance: &Utterance) -> Result<()>;
}

/// Speak `text` if it survives sanitization and filtering
///
/// Returns whether anything was spoken. Dropped text is not an error.
pub async fn speak_text<S>(output: &mut S, config: &SpeechConfig, text: &str) -> Result<bool>
where
    S: SpeechOutput + ?Sized,
{
    match Utterance::new(text, &config.voice, config.max_chars) {
        Some(utterance) => {
            output.speak(&utterance).await?;
            Ok(true)
        }
        None => {
            debug!(chars = text.chars().count(), "Skipping blank or overlong utterance");
            Ok(false)
        }
    }
}

/// Speech output that runs the native speech command
#[derive(Clone, Debug)]
pub struct CommandSpeaker {
    engine: SpeechEngine,
    program: String,
}

impl CommandSpeaker {
    pub fn new(config: &SpeechConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            engine: config.engine,
            program: config.program.clone(),
        })
    }
}

#[async_trait]
impl SpeechOutput for CommandSpeaker {
    async fn speak(&mut self, utterance: &Utterance) -> Result<()> {
        debug!(program = %self.program, voice = utterance.voice(), "Speaking utterance");
        let status = Command::new(&self.program)
            .args(self.engine.args(utterance.voice(), utterance.text()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .await
            .map_err(|e| SayError::Tts(format!("failed to run {}: {}", self.program, e)))?;

        if !status.success() {
            warn!(program = %self.program, %status, "Speech command exited unsuccessfully");
        }
        Ok(())
    }
}
