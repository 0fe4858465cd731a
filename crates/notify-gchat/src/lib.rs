//! Google Chat webhook back-end for lifecycle notifications.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

pub use error::{Error, Result};

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use reqwest::Client;
use scuttle_notify::{BoxError, Notifier, Phase, ThreadHandle};
use serde::Serialize;
use tracing::debug;

/// Upper bound on a single webhook request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct WebhookPayload {
    text: String,
}

impl WebhookPayload {
    fn at(node: &str, phase: &Phase, now: DateTime<Local>) -> Self {
        let stamp = now.format("%b %e %H:%M:%S%.3f");
        Self {
            text: format!("`{stamp}` `{}`", phase.message(node)),
        }
    }
}

/// Posts plain text messages to a Google Chat space webhook.
pub struct GoogleChatNotifier {
    client: Client,
    node: String,
    url: String,
}

impl GoogleChatNotifier {
    /// Creates a notifier posting to the space webhook at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(node: impl Into<String>, url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            node: node.into(),
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for GoogleChatNotifier {
    fn name(&self) -> &'static str {
        "google-chat"
    }

    async fn notify(
        &self,
        phase: &Phase,
        _thread: Option<&ThreadHandle>,
    ) -> std::result::Result<Option<ThreadHandle>, BoxError> {
        let payload = WebhookPayload::at(&self.node, phase, Local::now());

        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(Error::from)?
            .error_for_status()
            .map_err(Error::from)?;
        debug!(%phase, "google chat message posted");

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Json;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use chrono::TimeZone;
    use parking_lot::Mutex;
    use serde_json::Value;

    use super::*;

    type Captured = Arc<Mutex<Vec<Value>>>;

    async fn hook(State(captured): State<Captured>, Json(body): Json<Value>) -> StatusCode {
        captured.lock().push(body);
        StatusCode::OK
    }

    async fn serve(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://{addr}/v1/spaces/AAAA/messages")
    }

    #[test]
    fn test_payload_text() {
        let now = Local.with_ymd_and_hms(2024, 11, 21, 18, 4, 5).unwrap();
        let payload = WebhookPayload::at("worker-9", &Phase::Uncordon, now);

        assert_eq!(
            payload.text,
            "`Nov 21 18:04:05.000` `🐣 Uncordon node worker-9`"
        );
    }

    #[tokio::test]
    async fn test_posts_text_without_handle() {
        let captured = Captured::default();
        let app = axum::Router::new()
            .route("/v1/spaces/AAAA/messages", post(hook))
            .with_state(captured.clone());
        let url = serve(app).await;
        let notifier = GoogleChatNotifier::new("worker-9", url).unwrap();

        let handle = notifier
            .notify(&Phase::TermNotice, Some(&ThreadHandle::new("t")))
            .await
            .unwrap();

        assert_eq!(handle, None);
        let bodies = captured.lock().clone();
        assert_eq!(bodies.len(), 1);
        let text = bodies[0]["text"].as_str().unwrap();
        assert!(text.ends_with("`⏱️ Detected spot termination notice for worker-9`"));
    }

    #[tokio::test]
    async fn test_unreachable_webhook_is_an_error() {
        let notifier = GoogleChatNotifier::new("worker-9", "http://127.0.0.1:1/hook").unwrap();

        assert!(notifier.notify(&Phase::Delete, None).await.is_err());
    }
}
