//! Command-line entry point
//!
//! `yt-say <video_id|url>` connects to the stream's live chat and relays
//! comments until the chat ends.

use crate::chat::{parse_video_id, YouTubeChat, YouTubeConfig};
use crate::relay::{RelayConfig, RelayLoop, RelayStats};
use crate::speech::CommandSpeaker;
use crate::{Result, SayError};
use std::io::Write;
use tracing::info;

/// Lines printed when the video argument is missing
pub const USAGE: [&str; 2] = ["Usage: yt-say VIDEO_ID", "Example: yt-say dQw4w9WgXcQ"];

/// Pick the video argument out of the process arguments
///
/// The first element is the program name, as with `std::env::args`.
pub fn video_arg<I>(args: I) -> Result<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .nth(1)
        .ok_or_else(|| SayError::Usage("missing VIDEO_ID argument".to_string()))
}

/// Print the usage text
pub fn print_usage<W: Write>(out: &mut W) -> Result<()> {
    for line in USAGE {
        writeln!(out, "{}", line)?;
    }
    out.flush()?;
    Ok(())
}

/// Exit status for a missing video argument
pub const USAGE_EXIT_CODE: i32 = 1;

/// Run the program for the given process arguments, returning the exit code
///
/// A missing video argument prints the usage text and returns
/// `USAGE_EXIT_CODE` without opening a chat session.
pub async fn run_args<I, W>(
    args: I,
    config: RelayConfig,
    youtube: YouTubeConfig,
    mut out: W,
) -> Result<i32>
where
    I: IntoIterator<Item = String>,
    W: Write + Send,
{
    let video = match video_arg(args) {
        Ok(video) => video,
        Err(SayError::Usage(_)) => {
            print_usage(&mut out)?;
            return Ok(USAGE_EXIT_CODE);
        }
        Err(e) => return Err(e),
    };

    let stats = run(&video, config, youtube, out).await?;
    info!(received = stats.received, spoken = stats.spoken, "Done");
    Ok(0)
}

/// Connect to the live chat for `video` and relay it until it ends
pub async fn run<W>(
    video: &str,
    config: RelayConfig,
    youtube: YouTubeConfig,
    mut out: W,
) -> Result<RelayStats>
where
    W: Write + Send,
{
    config.validate()?;
    let video_id = parse_video_id(video)?;
    let speaker = CommandSpeaker::new(&config.speech)?;

    writeln!(out, "Connecting to live chat for video: {}", video_id)?;
    out.flush()?;
    let chat = YouTubeChat::connect(&video_id, youtube).await?;
    writeln!(out, "Connected! Listening for comments...\n")?;
    out.flush()?;
    info!(
        video_id = chat.video_id(),
        program = %config.speech.program,
        voice = %config.speech.voice,
        "Relaying live chat"
    );

    RelayLoop::new(chat, speaker, out, config).run().await
}
