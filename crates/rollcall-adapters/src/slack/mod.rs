//! Slack Web API as the chat platform.

mod blocks;
mod chat;

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use rollcall_ports::error::PortError;

use crate::http;

pub use blocks::render_blocks;

const SLACK_API: &str = "https://slack.com/api";

/// Who the bot token belongs to, as reported by `auth.test`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackIdentity {
    pub user: String,
    pub team: String,
}

#[derive(Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl SlackClient {
    pub fn new(token: impl Into<String>, timeout: Duration) -> Result<Self, PortError> {
        Self::with_base_url(token, timeout, SLACK_API)
    }

    pub fn with_base_url(
        token: impl Into<String>,
        timeout: Duration,
        base_url: impl Into<String>,
    ) -> Result<Self, PortError> {
        Ok(Self {
            http: http::client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub async fn auth_test(&self) -> Result<SlackIdentity, PortError> {
        let body = self.post("auth.test", &serde_json::json!({})).await?;
        let field = |key: &str| {
            body.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Ok(SlackIdentity {
            user: field("user"),
            team: field("team"),
        })
    }

    async fn post<B: Serialize + ?Sized>(&self, method: &str, body: &B) -> Result<Value, PortError> {
        let url = format!("{}/{}", self.base_url, method);
        debug!(method, "Slack request");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(http::transport_error)?;
        Self::envelope(response).await
    }

    async fn get(&self, method: &str, query: &[(&str, &str)]) -> Result<Value, PortError> {
        let url = format!("{}/{}", self.base_url, method);
        debug!(method, "Slack request");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .map_err(http::transport_error)?;
        Self::envelope(response).await
    }

    /// Slack answers 200 with `ok: false` for most failures; the error code
    /// becomes `PortError::Api`.
    async fn envelope(response: reqwest::Response) -> Result<Value, PortError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PortError::Api(format!("{status}: {body}")));
        }
        let body: Value = response.json().await.map_err(http::transport_error)?;
        if body.get("ok").and_then(Value::as_bool) == Some(true) {
            Ok(body)
        } else {
            let code = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown_error");
            Err(PortError::Api(code.to_string()))
        }
    }
}


#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::testing::client;
    use super::*;

    #[tokio::test]
    async fn auth_test_reports_identity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth.test"))
            .and(header("authorization", "Bearer xoxb-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true, "user": "rollcall", "team": "Acme"
            })))
            .mount(&server)
            .await;

        let identity = client(&server).auth_test().await.unwrap();
        assert_eq!(
            identity,
            SlackIdentity {
                user: "rollcall".into(),
                team: "Acme".into()
            }
        );
    }

    #[tokio::test]
    async fn not_ok_maps_error_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth.test"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "ok": false, "error": "invalid_auth" })),
            )
            .mount(&server)
            .await;

        let err = client(&server).auth_test().await.unwrap_err();
        assert_eq!(err, PortError::Api("invalid_auth".into()));
    }

    #[tokio::test]
    async fn http_failure_maps_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth.test"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server).auth_test().await.unwrap_err();
        assert!(matches!(err, PortError::Api(msg) if msg.starts_with("500")));
    }
}
