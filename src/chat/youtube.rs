//! YouTube live chat over the innertube web API
//!
//! `connect` loads the live chat popout page once to learn the API key,
//! client version and first continuation. Each `fetch_batch` then posts the
//! current continuation to `get_live_chat`, honoring the poll delay the
//! server advised with the previous page.

use super::parser::{self, Continuation, PageConfig};
use super::source::ChatSource;
use super::types::ChatMessage;
use crate::{Result, SayError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Configuration for the YouTube chat client
#[derive(Clone, Debug)]
pub struct YouTubeConfig {
    /// Scheme and host requests are sent to
    pub base_url: String,

    /// User agent presented to YouTube
    pub user_agent: String,

    /// Timeout for a single HTTP request
    pub request_timeout: Duration,

    /// Retries for transient failures before giving up
    pub max_retries: u32,

    /// Initial backoff between retries, doubled on each attempt
    pub retry_backoff: Duration,

    /// Upper bound on the server-advised wait between pages
    pub max_poll_wait: Duration,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(10),
            max_retries: 3,
            retry_backoff: Duration::from_secs(1),
            max_poll_wait: Duration::from_secs(10),
        }
    }
}

impl YouTubeConfig {
    /// Point the client at a different host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the retry policy for transient failures
    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = backoff;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(SayError::Config("YouTube base URL is required".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(SayError::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// An open live chat session for one video
pub struct YouTubeChat {
    client: reqwest::Client,
    config: YouTubeConfig,
    video_id: String,
    page: PageConfig,
    continuation: Option<Continuation>,
    next_poll: Instant,
}

impl YouTubeChat {
    /// Open the live chat for `video_id`
    pub async fn connect(video_id: &str, config: YouTubeConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()?;

        let url = format!("{}/live_chat", config.base_url);
        info!(video_id, "Loading live chat page");
        let (http, url) = (&client, &url);
        let html = with_retries(&config, || async move {
            let response = http
                .get(url)
                .query(&[("is_popout", "1"), ("v", video_id)])
                .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                .send()
                .await?;
            Ok::<_, SayError>(check_status(response)?.text().await?)
        })
        .await?;

        let page = parser::extract_page_config(&html)?;
        let initial_data = parser::extract_initial_data(&html)?;
        let continuation = parser::initial_continuation(&initial_data).ok_or_else(|| {
            SayError::ChatUnavailable(format!(
                "no live chat for video {} (stream offline or chat disabled)",
                video_id
            ))
        })?;
        debug!(
            client_version = %page.client_version,
            timeout_ms = ?continuation.timeout_ms,
            "Live chat page loaded"
        );

        Ok(Self {
            client,
            config,
            video_id: video_id.to_string(),
            page,
            // The first page is requested immediately
            next_poll: Instant::now(),
            continuation: Some(continuation),
        })
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    async fn request_page(&self, token: &str) -> Result<Value> {
        let url = format!("{}/youtubei/v1/live_chat/get_live_chat", self.config.base_url);
        let body = json!({
            "context": {
                "client": {
                    "clientName": "WEB",
                    "clientVersion": self.page.client_version,
                    "hl": "en",
                    "gl": "US",
                }
            },
            "continuation": token,
        });

        let (client, url, body) = (&self.client, &url, &body);
        let api_key = self.page.api_key.as_str();
        with_retries(&self.config, || async move {
            let response = client
                .post(url)
                .query(&[("key", api_key), ("prettyPrint", "false")])
                .json(body)
                .send()
                .await?;
            // A 200 can still carry an HTML interstitial, which is a parse failure
            let text = check_status(response)?.text().await?;
            Ok::<_, SayError>(serde_json::from_str::<Value>(&text)?)
        })
        .await
    }
}

#[async_trait]
impl ChatSource for YouTubeChat {
    fn is_alive(&self) -> bool {
        self.continuation.is_some()
    }

    async fn fetch_batch(&mut self) -> Result<Vec<ChatMessage>> {
        let Some(token) = self.continuation.as_ref().map(|c| c.token.clone()) else {
            return Ok(Vec::new());
        };

        sleep_until(self.next_poll).await;
        let response = self.request_page(&token).await?;
        let page = parser::parse_chat_response(&response)?;

        let wait = page
            .continuation
            .as_ref()
            .and_then(|c| c.timeout_ms)
            .map(Duration::from_millis)
            .unwrap_or_default()
            .min(self.config.max_poll_wait);
        self.next_poll = Instant::now() + wait;

        if page.continuation.is_none() {
            info!(video_id = %self.video_id, "Live chat has ended");
        }
        self.continuation = page.continuation;

        debug!(count = page.messages.len(), "Fetched chat batch");
        Ok(page.messages)
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(SayError::HttpStatus {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}

fn is_transient(err: &SayError) -> bool {
    matches!(err, SayError::Http(_) | SayError::HttpStatus { .. }) && err.is_recoverable()
}

/// Run `op`, retrying transient HTTP failures with exponential backoff
async fn with_retries<T, F, Fut>(config: &YouTubeConfig, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut backoff = config.retry_backoff;
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < config.max_retries && is_transient(&e) => {
                attempt += 1;
                warn!(attempt, error = %e, ?backoff, "Chat request failed, retrying");
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_youtube_config_default() {
        let config = YouTubeConfig::default();
        assert_eq!(config.base_url, "https://www.youtube.com");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.max_poll_wait, Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_youtube_config_builder() {
        let config = YouTubeConfig::default()
            .with_base_url("http://127.0.0.1:8080/")
            .with_retries(1, Duration::from_millis(5));
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.retry_backoff, Duration::from_millis(5));

        let empty = YouTubeConfig::default().with_base_url("");
        assert!(matches!(empty.validate(), Err(SayError::Config(_))));
    }

    #[test]
    fn test_transient_errors() {
        assert!(is_transient(&SayError::Http("reset".to_string())));
        let status = |status| SayError::HttpStatus {
            status,
            url: String::new(),
        };
        assert!(is_transient(&status(503)));
        assert!(is_transient(&status(429)));
        assert!(!is_transient(&status(404)));
        assert!(!is_transient(&SayError::ChatParse("bad".to_string())));
    }
}
