use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yt_say::chat::YouTubeConfig;
use yt_say::cli;
use yt_say::relay::RelayConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the chat
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yt_say=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting yt-say");
    let code = cli::run_args(
        std::env::args(),
        RelayConfig::detect(),
        YouTubeConfig::default(),
        std::io::stdout(),
    )
    .await
    .inspect_err(|e| error!(error = %e, "{}", e.user_message()))?;
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
