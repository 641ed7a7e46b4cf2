use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vbot_dispatcher::{Attachment, OutboundMessage, Visibility};

pub const SLACK_API_BASE: &str = "https://slack.com/api";

/// Where a reply for one inbound event has to go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyTarget {
    /// Per-interaction webhook handed out with slash commands and button clicks.
    ResponseUrl(String),
    /// Events API events only carry a channel, so replies go through the Web API.
    Channel { channel: String, user: String },
}

#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("HTTP request to Slack failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Slack API error: {0}")]
    Api(String),
    #[error("SLACK_BOT_TOKEN is required to reply to channel events")]
    MissingBotToken,
}

#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn deliver(&self, target: &ReplyTarget, message: &OutboundMessage)
        -> Result<(), ReplyError>;
}

pub struct SlackWebClient {
    client: Client,
    bot_token: Option<String>,
    api_base: String,
}

#[derive(Debug, Serialize)]
struct ResponseUrlBody<'a> {
    #[serde(flatten)]
    message: &'a OutboundMessage,
    replace_original: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    channel: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
    text: &'a str,
    attachments: &'a [Attachment],
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackWebClient {
    pub fn new(bot_token: Option<String>) -> Self {
        Self::with_api_base(bot_token, SLACK_API_BASE.to_string())
    }

    pub fn with_api_base(bot_token: Option<String>, api_base: String) -> Self {
        Self {
            client: Client::new(),
            bot_token,
            api_base,
        }
    }

    async fn post_to_response_url(
        &self,
        response_url: &str,
        message: &OutboundMessage,
    ) -> Result<(), ReplyError> {
        let body = ResponseUrlBody {
            message,
            replace_original: false,
        };

        self.client
            .post(response_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    async fn post_to_channel(
        &self,
        channel: &str,
        user: &str,
        message: &OutboundMessage,
    ) -> Result<(), ReplyError> {
        let token = self.bot_token.as_deref().ok_or(ReplyError::MissingBotToken)?;

        let (method, user) = match message.visibility {
            Visibility::Public => ("chat.postMessage", None),
            Visibility::Private => ("chat.postEphemeral", Some(user)),
        };
        let body = ChatMessage {
            channel,
            user,
            text: &message.text,
            attachments: &message.attachments,
        };

        let response: ApiResponse = self
            .client
            .post(format!("{}/{}", self.api_base, method))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.ok {
            return Err(ReplyError::Api(
                response.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl ReplySink for SlackWebClient {
    async fn deliver(
        &self,
        target: &ReplyTarget,
        message: &OutboundMessage,
    ) -> Result<(), ReplyError> {
        match target {
            ReplyTarget::ResponseUrl(url) => self.post_to_response_url(url, message).await,
            ReplyTarget::Channel { channel, user } => {
                self.post_to_channel(channel, user, message).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use vbot_dispatcher::messages;

    #[tokio::test]
    async fn response_url_gets_message_without_replacing_original() {
        let server = MockServer::start_async().await;
        let hook = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/commands/1")
                    .json_body(json!({
                        "response_type": "in_channel",
                        "text": "Howdy",
                        "replace_original": false
                    }));
                then.status(200).body("ok");
            })
            .await;

        let client = SlackWebClient::with_api_base(None, server.base_url());
        client
            .deliver(
                &ReplyTarget::ResponseUrl(server.url("/commands/1")),
                &messages::echo("Howdy"),
            )
            .await
            .expect("delivered");

        hook.assert_async().await;
    }

    #[tokio::test]
    async fn response_url_failure_surfaces_http_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/commands/expired");
                then.status(404).body("expired_url");
            })
            .await;

        let client = SlackWebClient::with_api_base(None, server.base_url());
        let result = client
            .deliver(
                &ReplyTarget::ResponseUrl(server.url("/commands/expired")),
                &messages::wave(),
            )
            .await;

        assert!(matches!(result, Err(ReplyError::Http(_))));
    }

    #[tokio::test]
    async fn public_channel_reply_uses_post_message() {
        let server = MockServer::start_async().await;
        let post = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat.postMessage")
                    .header("authorization", "Bearer xoxb-test")
                    .body_includes("\"channel\":\"C1\"")
                    .body_includes("\"text\":\":wave:\"");
                then.status(200)
                    .json_body(json!({ "ok": true, "channel": "C1", "ts": "1.2" }));
            })
            .await;

        let client = SlackWebClient::with_api_base(Some("xoxb-test".into()), server.base_url());
        client
            .deliver(
                &ReplyTarget::Channel {
                    channel: "C1".into(),
                    user: "U1".into(),
                },
                &messages::wave(),
            )
            .await
            .expect("posted");

        post.assert_async().await;
    }

    #[tokio::test]
    async fn private_channel_reply_uses_post_ephemeral() {
        let server = MockServer::start_async().await;
        let post = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat.postEphemeral")
                    .body_includes("\"user\":\"U1\"");
                then.status(200).json_body(json!({ "ok": true }));
            })
            .await;

        let client = SlackWebClient::with_api_base(Some("xoxb-test".into()), server.base_url());
        client
            .deliver(
                &ReplyTarget::Channel {
                    channel: "C1".into(),
                    user: "U1".into(),
                },
                &messages::greeting("alice"),
            )
            .await
            .expect("posted");

        post.assert_async().await;
    }

    #[tokio::test]
    async fn slack_api_error_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat.postMessage");
                then.status(200)
                    .json_body(json!({ "ok": false, "error": "channel_not_found" }));
            })
            .await;

        let client = SlackWebClient::with_api_base(Some("xoxb-test".into()), server.base_url());
        let result = client
            .deliver(
                &ReplyTarget::Channel {
                    channel: "C404".into(),
                    user: "U1".into(),
                },
                &messages::wave(),
            )
            .await;

        match result {
            Err(ReplyError::Api(error)) => assert_eq!(error, "channel_not_found"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn channel_reply_without_token_fails_fast() {
        let client = SlackWebClient::with_api_base(None, "http://127.0.0.1:9".into());
        let result = client
            .deliver(
                &ReplyTarget::Channel {
                    channel: "C1".into(),
                    user: "U1".into(),
                },
                &messages::wave(),
            )
            .await;

        assert!(matches!(result, Err(ReplyError::MissingBotToken)));
    }
}
