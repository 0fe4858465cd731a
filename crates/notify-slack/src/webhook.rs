use crate::attachment::Attachment;
use crate::error::Result;
use crate::http_client;

use async_trait::async_trait;
use reqwest::Client;
use scuttle_notify::{BoxError, Notifier, Phase, ThreadHandle};
use serde::Serialize;

#[derive(Serialize)]
struct WebhookMessage<'a> {
    attachments: [&'a Attachment; 1],
}

/// Slack incoming webhook notifier. Webhooks cannot thread, so no handle is
/// ever returned.
pub struct SlackWebhookNotifier {
    client: Client,
    node: String,
    url: String,
}

impl SlackWebhookNotifier {
    /// Creates a notifier posting to the webhook at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(node: impl Into<String>, url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            node: node.into(),
            url: url.into(),
        })
    }

    async fn post(&self, attachment: &Attachment) -> Result<()> {
        self.client
            .post(&self.url)
            .json(&WebhookMessage {
                attachments: [attachment],
            })
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[async_trait]
impl Notifier for SlackWebhookNotifier {
    fn name(&self) -> &'static str {
        "slack-webhook"
    }

    async fn notify(
        &self,
        phase: &Phase,
        _thread: Option<&ThreadHandle>,
    ) -> std::result::Result<Option<ThreadHandle>, BoxError> {
        self.post(&Attachment::for_phase(&self.node, phase)).await?;

        Ok(None)
    }
}
