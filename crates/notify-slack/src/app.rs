use crate::attachment::Attachment;
use crate::error::{Error, Result};
use crate::http_client;

use async_trait::async_trait;
use reqwest::Client;
use scuttle_notify::{BoxError, Notifier, Phase, ThreadHandle};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

static SLACK_API_URL: &str = "https://slack.com/api";

#[derive(Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    attachments: [&'a Attachment; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
}

#[derive(Serialize)]
struct AddReaction<'a> {
    channel: &'a str,
    name: &'a str,
    timestamp: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    error: Option<String>,
    ts: Option<String>,
}

/// Slack Web API notifier. Threads every message after the first under the
/// first message of the run.
pub struct SlackAppNotifier {
    api_url: String,
    channel: String,
    client: Client,
    node: String,
    token: String,
}

impl SlackAppNotifier {
    /// Creates a notifier posting as the bot owning `token` into `channel`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        node: impl Into<String>,
        channel: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            api_url: SLACK_API_URL.to_string(),
            channel: channel.into(),
            client: http_client()?,
            node: node.into(),
            token: token.into(),
        })
    }

    /// Points the notifier at a different Web API base URL.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    async fn call<B: Serialize + Sync>(&self, method: &'static str, body: &B) -> Result<ApiResponse> {
        let response: ApiResponse = self
            .client
            .post(format!("{}/{method}", self.api_url))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.ok {
            return Err(Error::Api {
                method,
                error: response.error.unwrap_or_else(|| "unknown_error".to_string()),
            });
        }

        Ok(response)
    }

    async fn post_message(&self, attachment: &Attachment, thread: Option<&str>) -> Result<String> {
        let response = self
            .call(
                "chat.postMessage",
                &PostMessage {
                    channel: &self.channel,
                    attachments: [attachment],
                    thread_ts: thread,
                },
            )
            .await?;

        response.ts.ok_or(Error::MissingTimestamp("chat.postMessage"))
    }

    async fn add_reaction(&self, name: &str, thread: &str) -> Result<()> {
        self.call(
            "reactions.add",
            &AddReaction {
                channel: &self.channel,
                name,
                timestamp: thread,
            },
        )
        .await?;

        Ok(())
    }
}

#[async_trait]
impl Notifier for SlackAppNotifier {
    fn name(&self) -> &'static str {
        "slack-app"
    }

    async fn notify(
        &self,
        phase: &Phase,
        thread: Option<&ThreadHandle>,
    ) -> std::result::Result<Option<ThreadHandle>, BoxError> {
        // Reactions mark the thread root; a failed reaction never blocks the post.
        if let (Some(reaction), Some(thread)) = (phase.reaction(), thread) {
            if let Err(e) = self.add_reaction(reaction, thread.as_str()).await {
                warn!(%phase, error = %e, "error posting Slack reaction");
            }
        }

        let attachment = Attachment::for_phase(&self.node, phase);
        let ts = self
            .post_message(&attachment, thread.map(ThreadHandle::as_str))
            .await?;
        debug!(%phase, %ts, "posted Slack message");

        Ok(Some(
            thread.cloned().unwrap_or_else(|| ThreadHandle::new(ts)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Captured, spawn_server};

    use axum::Json;
    use axum::extract::State;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use serde_json::{Value, json};

    async fn post_message(
        State(captured): State<Captured>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        captured.push(json!({ "method": "chat.postMessage", "auth": auth, "body": body }));
        let n = captured.len();
        Json(json!({ "ok": true, "ts": format!("1700000000.00000{n}") }))
    }

    async fn add_reaction(State(captured): State<Captured>, Json(body): Json<Value>) -> Json<Value> {
        captured.push(json!({ "method": "reactions.add", "body": body }));
        Json(json!({ "ok": true }))
    }

    async fn rejecting(Json(_body): Json<Value>) -> Json<Value> {
        Json(json!({ "ok": false, "error": "channel_not_found" }))
    }

    fn router(captured: Captured) -> axum::Router {
        axum::Router::new()
            .route("/chat.postMessage", post(post_message))
            .route("/reactions.add", post(add_reaction))
            .with_state(captured)
    }

    #[tokio::test]
    async fn test_first_message_opens_thread() {
        let captured = Captured::default();
        let base = spawn_server(router(captured.clone())).await;
        let notifier = SlackAppNotifier::new("worker-1", "C0FAKE", "xoxb-test")
            .unwrap()
            .with_api_url(base);

        let handle = notifier.notify(&Phase::Shutdown, None).await.unwrap();

        assert_eq!(handle, Some(ThreadHandle::new("1700000000.000001")));
        let calls = captured.take();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0]["auth"], "Bearer xoxb-test");
        assert_eq!(calls[0]["body"]["channel"], "C0FAKE");
        assert!(calls[0]["body"].get("thread_ts").is_none());
        assert_eq!(
            calls[0]["body"]["attachments"][0]["text"],
            "⚠️ Detected shutdown of `worker-1`"
        );
    }

    #[tokio::test]
    async fn test_reply_reacts_and_keeps_thread_root() {
        let captured = Captured::default();
        let base = spawn_server(router(captured.clone())).await;
        let notifier = SlackAppNotifier::new("worker-1", "C0FAKE", "xoxb-test")
            .unwrap()
            .with_api_url(base);
        let root = ThreadHandle::new("1699999999.000900");

        let handle = notifier.notify(&Phase::Drain, Some(&root)).await.unwrap();

        assert_eq!(handle, Some(root));
        let calls = captured.take();
        assert_eq!(calls[0]["method"], "reactions.add");
        assert_eq!(calls[0]["body"]["name"], "droplet");
        assert_eq!(calls[0]["body"]["timestamp"], "1699999999.000900");
        assert_eq!(calls[1]["method"], "chat.postMessage");
        assert_eq!(calls[1]["body"]["thread_ts"], "1699999999.000900");
        assert_eq!(calls[1]["body"]["attachments"][0]["color"], "warning");
    }

    #[tokio::test]
    async fn test_api_error_is_returned() {
        let app = axum::Router::new().route("/chat.postMessage", post(rejecting));
        let base = spawn_server(app).await;
        let notifier = SlackAppNotifier::new("worker-1", "C0FAKE", "xoxb-test")
            .unwrap()
            .with_api_url(base);

        let err = notifier.notify(&Phase::Uncordon, None).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "slack chat.postMessage failed: channel_not_found"
        );
    }
}
