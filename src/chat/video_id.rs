//! Video id extraction
//!
//! Accepts either a bare 11 character video id or any of the common YouTube
//! URL shapes and reduces it to the id.

use crate::{Result, SayError};
use url::Url;

const VIDEO_ID_LEN: usize = 11;

/// Path prefixes that are followed directly by a video id
const ID_PATH_PREFIXES: [&str; 4] = ["live", "shorts", "embed", "v"];

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == VIDEO_ID_LEN
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn is_youtube_host(host: &str) -> bool {
    let host = host.strip_prefix("www.").unwrap_or(host);
    let host = host.strip_prefix("m.").unwrap_or(host);
    host == "youtube.com" || host == "music.youtube.com"
}

/// Extract a video id from user input
pub fn parse_video_id(input: &str) -> Result<String> {
    let input = input.trim();
    if is_video_id(input) {
        return Ok(input.to_string());
    }

    let with_scheme = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };
    let url = Url::parse(&with_scheme).map_err(|_| SayError::InvalidVideoId(input.to_string()))?;
    let host = url.host_str().unwrap_or_default();

    let candidate = if host == "youtu.be" || host == "www.youtu.be" {
        url.path_segments()
            .and_then(|mut segments| segments.next())
            .map(str::to_string)
    } else if is_youtube_host(host) {
        url.query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
            .or_else(|| {
                let segments: Vec<&str> = url.path_segments()?.collect();
                match segments.as_slice() {
                    [prefix, id, ..] if ID_PATH_PREFIXES.contains(prefix) => Some(id.to_string()),
                    _ => None,
                }
            })
    } else {
        None
    };

    match candidate {
        Some(id) if is_video_id(&id) => Ok(id),
        _ => Err(SayError::InvalidVideoId(input.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_id() {
        assert_eq!(parse_video_id("dQw4w9WgXcQ").unwrap(), "dQw4w9WgXcQ");
        assert_eq!(parse_video_id("  a-b_c1234XY ").unwrap(), "a-b_c1234XY");
    }

    #[test]
    fn test_watch_urls() {
        let urls = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ&t=42",
            "https://www.youtube.com/live_chat?is_popout=1&v=dQw4w9WgXcQ",
        ];
        for url in urls {
            assert_eq!(parse_video_id(url).unwrap(), "dQw4w9WgXcQ", "{}", url);
        }
    }

    #[test]
    fn test_path_urls() {
        let urls = [
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?si=abc",
            "https://www.youtube.com/live/dQw4w9WgXcQ?feature=shared",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
        ];
        for url in urls {
            assert_eq!(parse_video_id(url).unwrap(), "dQw4w9WgXcQ", "{}", url);
        }
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_video_id("").is_err());
        assert!(parse_video_id("short").is_err());
        assert!(parse_video_id("https://example.com/watch?v=dQw4w9WgXcQ").is_err());
        assert!(parse_video_id("https://www.youtube.com/channel/UC1234567890").is_err());
        assert!(matches!(
            parse_video_id("not an id!!"),
            Err(SayError::InvalidVideoId(_))
        ));
    }
}
