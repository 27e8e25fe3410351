//! Parsing of YouTube live chat pages and innertube responses
//!
//! The live chat popout page embeds the innertube API key, the web client
//! version and a `ytInitialData` JSON blob holding the first continuation.
//! Each `get_live_chat` response carries new chat actions plus the next
//! continuation, or no continuation once the chat has ended.

use super::types::ChatMessage;
use crate::{Result, SayError};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

/// Continuation kinds that carry a usable token
const CONTINUATION_KINDS: [&str; 3] = [
    "invalidationContinuationData",
    "timedContinuationData",
    "reloadContinuationData",
];

/// Client settings scraped from the live chat page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageConfig {
    pub api_key: String,
    pub client_version: String,
}

/// Token naming the next page of chat
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Continuation {
    pub token: String,

    /// Server-advised delay before asking for the next page
    pub timeout_ms: Option<u64>,
}

/// One parsed `get_live_chat` response
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChatPage {
    pub messages: Vec<ChatMessage>,

    /// `None` means the chat has ended
    pub continuation: Option<Continuation>,
}

/// Find `"key":"value"` in raw page text and return the value
pub fn extract_quoted_value(text: &str, key: &str) -> Option<String> {
    let needle = format!("\"{}\":\"", key);
    let start = text.find(&needle)? + needle.len();
    let len = text[start..].find('"')?;
    let value = &text[start..start + len];
    (!value.is_empty()).then(|| value.to_string())
}

/// Scrape the innertube client settings from the live chat page
pub fn extract_page_config(html: &str) -> Result<PageConfig> {
    let api_key = extract_quoted_value(html, "INNERTUBE_API_KEY")
        .ok_or_else(|| SayError::ChatParse("INNERTUBE_API_KEY not found in page".to_string()))?;
    let client_version = extract_quoted_value(html, "INNERTUBE_CLIENT_VERSION").ok_or_else(|| {
        SayError::ChatParse("INNERTUBE_CLIENT_VERSION not found in page".to_string())
    })?;
    Ok(PageConfig {
        api_key,
        client_version,
    })
}

/// Extract the `ytInitialData` JSON object embedded in the page
pub fn extract_initial_data(html: &str) -> Result<Value> {
    let marker = html
        .find("ytInitialData")
        .ok_or_else(|| SayError::ChatParse("ytInitialData not found in page".to_string()))?;
    let rest = &html[marker..];
    let open = rest
        .find('{')
        .ok_or_else(|| SayError::ChatParse("ytInitialData has no JSON body".to_string()))?;

    // The object is followed by `;</script>`, so only read the first value
    let mut values = serde_json::Deserializer::from_str(&rest[open..]).into_iter::<Value>();
    match values.next() {
        Some(value) => Ok(value?),
        None => Err(SayError::ChatParse("ytInitialData is empty".to_string())),
    }
}

/// Read a continuation out of a `continuations[n]` entry
pub fn parse_continuation(entry: &Value) -> Option<Continuation> {
    CONTINUATION_KINDS.iter().find_map(|kind| {
        let data = entry.get(*kind)?;
        let token = data.get("continuation")?.as_str()?.to_string();
        let timeout_ms = data.get("timeoutMs").and_then(Value::as_u64);
        Some(Continuation { token, timeout_ms })
    })
}

/// The first continuation of a freshly loaded live chat page
pub fn initial_continuation(initial_data: &Value) -> Option<Continuation> {
    initial_data
        .pointer("/contents/liveChatRenderer/continuations")?
        .as_array()?
        .iter()
        .find_map(parse_continuation)
}

/// Parse a `get_live_chat` response body
pub fn parse_chat_response(response: &Value) -> Result<ChatPage> {
    let Some(chat) = response.pointer("/continuationContents/liveChatContinuation") else {
        debug!("Response has no liveChatContinuation; treating chat as ended");
        return Ok(ChatPage::default());
    };

    let continuation = chat
        .get("continuations")
        .and_then(Value::as_array)
        .and_then(|entries| entries.iter().find_map(parse_continuation));

    let messages = chat
        .get("actions")
        .and_then(Value::as_array)
        .map(|actions| actions.iter().filter_map(parse_action).collect())
        .unwrap_or_default();

    Ok(ChatPage {
        messages,
        continuation,
    })
}

fn parse_action(action: &Value) -> Option<ChatMessage> {
    let item = action.pointer("/addChatItemAction/item")?;

    let (renderer, body) = if let Some(r) = item.get("liveChatTextMessageRenderer") {
        (r, render_runs(r.get("message")))
    } else if let Some(r) = item.get("liveChatPaidMessageRenderer") {
        (r, render_runs(r.get("message")))
    } else if let Some(r) = item.get("liveChatPaidStickerRenderer") {
        (r, String::new())
    } else if let Some(r) = item.get("liveChatMembershipItemRenderer") {
        let body = match r.get("message") {
            Some(message) => render_runs(Some(message)),
            None => render_runs(r.get("headerSubtext")),
        };
        (r, body)
    } else {
        return None;
    };

    let author = renderer
        .pointer("/authorName/simpleText")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let mut message = ChatMessage::new(author, body);
    if let Some(ts) = renderer
        .get("timestampUsec")
        .and_then(Value::as_str)
        .and_then(parse_timestamp_usec)
    {
        message = message.with_published_at(ts);
    }
    Some(message)
}

/// Flatten a `{ runs: [...] }` or `{ simpleText }` text object
pub fn render_runs(text: Option<&Value>) -> String {
    let Some(text) = text else {
        return String::new();
    };
    if let Some(simple) = text.get("simpleText").and_then(Value::as_str) {
        return simple.to_string();
    }

    let mut out = String::new();
    for run in text.get("runs").and_then(Value::as_array).into_iter().flatten() {
        if let Some(t) = run.get("text").and_then(Value::as_str) {
            out.push_str(t);
        } else if let Some(emoji) = run.get("emoji") {
            let shortcut = emoji
                .pointer("/shortcuts/0")
                .or_else(|| emoji.get("emojiId"))
                .and_then(Value::as_str);
            if let Some(s) = shortcut {
                out.push_str(s);
            }
        }
    }
    out
}

fn parse_timestamp_usec(usec: &str) -> Option<DateTime<Utc>> {
    let usec: i64 = usec.parse().ok()?;
    DateTime::from_timestamp_micros(usec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text_action(author: &str, runs: Value) -> Value {
        json!({
            "addChatItemAction": {
                "item": {
                    "liveChatTextMessageRenderer": {
                        "authorName": { "simpleText": author },
                        "message": { "runs": runs },
                        "timestampUsec": "1700000000000000"
                    }
                }
            }
        })
    }

    #[test]
    fn test_extract_page_config() {
        let html = r#"<script>ytcfg.set({"INNERTUBE_API_KEY":"AIzaTest","INNERTUBE_CLIENT_VERSION":"2.20240101.00.00"});</script>"#;
        let config = extract_page_config(html).unwrap();
        assert_eq!(config.api_key, "AIzaTest");
        assert_eq!(config.client_version, "2.20240101.00.00");
    }

    #[test]
    fn test_extract_page_config_missing_key() {
        let err = extract_page_config("<html></html>").unwrap_err();
        assert!(matches!(err, SayError::ChatParse(_)));
    }

    #[test]
    fn test_extract_initial_data_and_continuation() {
        let html = r#"<script>window["ytInitialData"] = {"contents":{"liveChatRenderer":{"continuations":[{"invalidationContinuationData":{"continuation":"tok0","timeoutMs":5000}}],"actions":[]}}};</script><script>var other = {};</script>"#;
        let data = extract_initial_data(html).unwrap();
        let continuation = initial_continuation(&data).unwrap();
        assert_eq!(continuation.token, "tok0");
        assert_eq!(continuation.timeout_ms, Some(5000));
    }

    #[test]
    fn test_initial_data_without_chat() {
        let html = r#"var ytInitialData = {"contents":{"messageRenderer":{"text":{"simpleText":"Chat is disabled"}}}};"#;
        let data = extract_initial_data(html).unwrap();
        assert!(initial_continuation(&data).is_none());
    }

    #[test]
    fn test_render_runs_with_emoji() {
        let text = json!({
            "runs": [
                { "text": "hello " },
                { "emoji": { "emojiId": "UCxyz/abc", "shortcuts": [":wave:", ":hi:"] } },
                { "text": " there" },
                { "emoji": { "emojiId": "😀" } }
            ]
        });
        assert_eq!(render_runs(Some(&text)), "hello :wave: there😀");
        assert_eq!(render_runs(None), "");
        assert_eq!(render_runs(Some(&json!({ "simpleText": "plain" }))), "plain");
    }

    #[test]
    fn test_parse_chat_response() {
        let response = json!({
            "continuationContents": {
                "liveChatContinuation": {
                    "continuations": [
                        { "timedContinuationData": { "continuation": "tok1", "timeoutMs": 2500 } }
                    ],
                    "actions": [
                        text_action("Nu11", json!([{ "text": "hello world" }])),
                        { "markChatItemAsDeletedAction": { "targetItemId": "x" } },
                        {
                            "addChatItemAction": {
                                "item": {
                                    "liveChatPaidMessageRenderer": {
                                        "authorName": { "simpleText": "Donor" },
                                        "purchaseAmountText": { "simpleText": "$5.00" },
                                        "message": { "runs": [{ "text": "great stream" }] }
                                    }
                                }
                            }
                        },
                        {
                            "addChatItemAction": {
                                "item": {
                                    "liveChatPaidStickerRenderer": {
                                        "authorName": { "simpleText": "Sticker" }
                                    }
                                }
                            }
                        },
                        {
                            "addChatItemAction": {
                                "item": {
                                    "liveChatMembershipItemRenderer": {
                                        "authorName": { "simpleText": "Member" },
                                        "headerSubtext": { "runs": [{ "text": "Welcome to the club" }] }
                                    }
                                }
                            }
                        },
                        {
                            "addChatItemAction": {
                                "item": { "liveChatViewerEngagementMessageRenderer": {} }
                            }
                        }
                    ]
                }
            }
        });

        let page = parse_chat_response(&response).unwrap();
        assert_eq!(
            page.continuation,
            Some(Continuation {
                token: "tok1".to_string(),
                timeout_ms: Some(2500),
            })
        );

        let lines: Vec<String> = page.messages.iter().map(ChatMessage::log_line).collect();
        assert_eq!(
            lines,
            vec![
                "Nu11: hello world",
                "Donor: great stream",
                "Sticker: ",
                "Member: Welcome to the club",
            ]
        );
        assert_eq!(
            page.messages[0].published_at,
            DateTime::from_timestamp(1_700_000_000, 0)
        );
    }

    #[test]
    fn test_parse_chat_response_ended() {
        let response = json!({ "responseContext": {} });
        let page = parse_chat_response(&response).unwrap();
        assert!(page.continuation.is_none());
        assert!(page.messages.is_empty());

        let no_continuation = json!({
            "continuationContents": {
                "liveChatContinuation": {
                    "actions": [text_action("a", json!([{ "text": "last" }]))]
                }
            }
        });
        let page = parse_chat_response(&no_continuation).unwrap();
        assert!(page.continuation.is_none());
        assert_eq!(page.messages.len(), 1);
    }
}
