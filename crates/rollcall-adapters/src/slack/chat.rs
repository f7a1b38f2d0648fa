use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use rollcall_core::ids::{ChannelId, ChatUserId, MessageId};
use rollcall_core::message::Block;
use rollcall_ports::error::PortError;
use rollcall_ports::outbound::ChatPlatform;
use rollcall_ports::types::PostedMessage;

use super::blocks::render_blocks;
use super::SlackClient;

/// Slack rejects longer channel topics.
const MAX_TOPIC_CHARS: usize = 250;

fn truncate_topic(topic: &str) -> String {
    topic.chars().take(MAX_TOPIC_CHARS).collect()
}

#[async_trait]
impl ChatPlatform for SlackClient {
    async fn post_message(
        &self,
        channel: &ChannelId,
        summary_text: &str,
        blocks: &[Block],
    ) -> Result<PostedMessage, PortError> {
        let body = json!({
            "channel": channel.as_str(),
            "text": summary_text,
            "blocks": render_blocks(blocks),
            "unfurl_links": false,
            "unfurl_media": false,
        });
        let response = self.post("chat.postMessage", &body).await?;
        let ts = response
            .get("ts")
            .and_then(Value::as_str)
            .ok_or_else(|| PortError::Decode("chat.postMessage response has no ts".into()))?;
        let message_id = MessageId::parse(ts).map_err(|e| PortError::Decode(e.to_string()))?;
        debug!(channel = %channel, ts = %message_id, "message posted");
        Ok(PostedMessage { message_id })
    }

    async fn set_topic(&self, channel: &ChannelId, topic: &str) -> Result<(), PortError> {
        let body = json!({
            "channel": channel.as_str(),
            "topic": truncate_topic(topic),
        });
        self.post("conversations.setTopic", &body).await?;
        Ok(())
    }

    async fn pin_message(
        &self,
        channel: &ChannelId,
        message: &MessageId,
    ) -> Result<(), PortError> {
        let body = json!({
            "channel": channel.as_str(),
            "timestamp": message.as_str(),
        });
        self.post("pins.add", &body).await?;
        Ok(())
    }

    async fn lookup_user_by_email(&self, email: &str) -> Result<Option<ChatUserId>, PortError> {
        match self.get("users.lookupByEmail", &[("email", email)]).await {
            Ok(body) => Ok(body
                .pointer("/user/id")
                .and_then(Value::as_str)
                .and_then(|id| ChatUserId::parse(id).ok())),
            Err(PortError::Api(code)) if code == "users_not_found" => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::super::testing::client;
    use super::*;

    fn channel() -> ChannelId {
        ChannelId::parse("C123").unwrap()
    }

    #[tokio::test]
    async fn post_message_returns_ts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(body_partial_json(json!({
                "channel": "C123",
                "text": "On-call update",
                "unfurl_links": false,
                "blocks": [{ "type": "divider" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true, "channel": "C123", "ts": "1736949600.000100"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let posted = client(&server)
            .post_message(&channel(), "On-call update", &[Block::Divider])
            .await
            .unwrap();
        assert_eq!(posted.message_id.as_str(), "1736949600.000100");
    }

    #[tokio::test]
    async fn post_message_not_in_channel() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "ok": false, "error": "not_in_channel" })),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .post_message(&channel(), "x", &[])
            .await
            .unwrap_err();
        assert_eq!(err, PortError::Api("not_in_channel".into()));
    }

    #[tokio::test]
    async fn set_topic_truncates() {
        let server = MockServer::start().await;
        let long = "x".repeat(300);
        Mock::given(method("POST"))
            .and(path("/conversations.setTopic"))
            .and(body_partial_json(json!({ "channel": "C123", "topic": "x".repeat(250) })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).set_topic(&channel(), &long).await.unwrap();
    }

    #[test]
    fn truncation_counts_characters() {
        let topic = "🚨".repeat(260);
        assert_eq!(truncate_topic(&topic).chars().count(), 250);
        assert_eq!(truncate_topic("short"), "short");
    }

    #[tokio::test]
    async fn pin_sends_timestamp() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pins.add"))
            .and(body_partial_json(json!({ "channel": "C123", "timestamp": "1.2" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .pin_message(&channel(), &MessageId::parse("1.2").unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn lookup_by_email_finds_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users.lookupByEmail"))
            .and(query_param("email", "jane@example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true, "user": { "id": "U42" }
            })))
            .mount(&server)
            .await;

        let id = client(&server)
            .lookup_user_by_email("jane@example.com")
            .await
            .unwrap();
        assert_eq!(id.map(|i| i.to_string()), Some("U42".to_string()));
    }

    #[tokio::test]
    async fn lookup_unknown_email_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users.lookupByEmail"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "ok": false, "error": "users_not_found" })),
            )
            .mount(&server)
            .await;

        let id = client(&server)
            .lookup_user_by_email("ghost@example.com")
            .await
            .unwrap();
        assert!(id.is_none());
    }

    #[tokio::test]
    async fn lookup_missing_scope_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users.lookupByEmail"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "ok": false, "error": "missing_scope" })),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .lookup_user_by_email("jane@example.com")
            .await
            .unwrap_err();
        assert_eq!(err, PortError::Api("missing_scope".into()));
    }
}
