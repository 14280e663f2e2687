//! Google Chat webhook client.
//!
//! Chat incoming webhooks take a plain `{"text": ...}` POST. Threading is
//! controlled through the URL rather than the body: posts that share a
//! `threadKey` query parameter land in the same thread, while posts
//! without one each open a new thread. Non-threaded delivery therefore
//! pins every message to one fixed key so a chatty pipeline does not
//! flood the space with single-message threads.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::ResourceError;

/// Fixed thread slot used for all non-threaded posts.
pub const THREAD_KEY: &str = "concourse-notifications";

/// Outbound request timeout. The webhook is a single fire-and-forget
/// call; a hung endpoint must not stall the Concourse job indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Webhook payload.
#[derive(Debug, Serialize)]
struct ChatPayload<'a> {
    text: &'a str,
}

/// Google Chat webhook client.
pub struct ChatClient {
    client: reqwest::Client,
}

impl ChatClient {
    /// Create a client with the fixed request timeout.
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// Deliver `text` to the webhook at `url`.
    ///
    /// Returns the HTTP status code and the raw reply body. A non-2xx
    /// status is a hard failure; there is no retry.
    pub async fn deliver(
        &self,
        url: &str,
        text: &str,
        create_thread: bool,
    ) -> Result<(u16, String), ResourceError> {
        let target = resolve_target(url, create_thread)?;

        debug!(url = %target, bytes = text.len(), "Posting to Google Chat webhook");

        let response = self
            .client
            .post(target)
            .header("Content-Type", "application/json; charset=UTF-8")
            .body(serde_json::to_string(&ChatPayload { text })?)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            debug!(status = status.as_u16(), "Webhook accepted the message");
            Ok((status.as_u16(), body))
        } else {
            warn!(status = status.as_u16(), body = %body, "Webhook request failed");
            Err(ResourceError::Delivery {
                status: status.as_u16(),
                body,
            })
        }
    }
}

impl Default for ChatClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the final target URL.
///
/// With `create_thread` the configured URL is used verbatim. Without it,
/// the query string gains `threadKey=<THREAD_KEY>`, replacing any
/// pre-existing `threadKey` and preserving every other query pair.
fn resolve_target(url: &str, create_thread: bool) -> Result<Url, ResourceError> {
    let mut target = Url::parse(url)?;

    if !create_thread {
        let pairs: Vec<(String, String)> = target
            .query_pairs()
            .filter(|(key, _)| key != "threadKey")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let mut query = target.query_pairs_mut();
        query.clear();
        for (key, value) in &pairs {
            query.append_pair(key, value);
        }
        query.append_pair("threadKey", THREAD_KEY);
        drop(query);
    }

    Ok(target)
}

/// Reply from the Chat API, as echoed by the webhook.
///
/// Every field is optional; a bare `{}` reply is perfectly valid and
/// surfaces as all-null metadata downstream.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookReply {
    /// Message text echoed back by the API
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub sender: Option<ReplySender>,
    #[serde(default)]
    pub space: Option<ReplySpace>,
    #[serde(default)]
    pub thread: Option<ReplyThread>,
    #[serde(default)]
    pub create_time: Option<String>,
}

impl WebhookReply {
    /// Parse the raw reply body.
    pub fn from_json(body: &str) -> Result<Self, ResourceError> {
        serde_json::from_str(body).map_err(ResourceError::ResponseParse)
    }
}

/// `sender` object of the reply.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplySender {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// `space` object of the reply.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplySpace {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(rename = "type", default)]
    pub space_type: Option<String>,
}

/// `thread` object of the reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyThread {
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_key_appended_by_default() {
        let target = resolve_target("https://chat.googleapis.com/v1/spaces/A/messages?key=k&token=t", false)
            .unwrap();
        assert_eq!(
            target.as_str(),
            "https://chat.googleapis.com/v1/spaces/A/messages?key=k&token=t&threadKey=concourse-notifications"
        );
    }

    #[test]
    fn test_existing_thread_key_replaced() {
        let target =
            resolve_target("https://chat.test/post?threadKey=custom&key=k", false).unwrap();
        assert_eq!(
            target.as_str(),
            "https://chat.test/post?key=k&threadKey=concourse-notifications"
        );
    }

    #[test]
    fn test_url_untouched_when_creating_threads() {
        let target = resolve_target("https://chat.test/post?key=k", true).unwrap();
        assert_eq!(target.as_str(), "https://chat.test/post?key=k");
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(matches!(
            resolve_target("not a url", false),
            Err(ResourceError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_reply_with_all_fields() {
        let reply = WebhookReply::from_json(
            r#"{
                "sender": {"name": "users/bot", "displayName": "CI Bot"},
                "space": {"name": "spaces/X", "displayName": "Builds", "type": "ROOM"},
                "thread": {"name": "spaces/X/threads/T"},
                "createTime": "2024-05-01T12:00:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(reply.sender.as_ref().unwrap().name.as_deref(), Some("users/bot"));
        assert_eq!(
            reply.sender.as_ref().unwrap().display_name.as_deref(),
            Some("CI Bot")
        );
        assert_eq!(reply.space.as_ref().unwrap().space_type.as_deref(), Some("ROOM"));
        assert_eq!(
            reply.thread.as_ref().unwrap().name.as_deref(),
            Some("spaces/X/threads/T")
        );
        assert_eq!(reply.create_time.as_deref(), Some("2024-05-01T12:00:00Z"));
    }

    #[test]
    fn test_empty_reply_is_valid() {
        let reply = WebhookReply::from_json("{}").unwrap();
        assert!(reply.sender.is_none());
        assert!(reply.space.is_none());
        assert!(reply.thread.is_none());
        assert!(reply.create_time.is_none());
    }

    #[test]
    fn test_malformed_reply_is_a_parse_error() {
        assert!(matches!(
            WebhookReply::from_json("not json"),
            Err(ResourceError::ResponseParse(_))
        ));
    }
}
