use std::fmt;

use crate::{Error, Result};

static GOOGLE_CHAT_PREFIX: &str = "https://chat.googleapis.com/";

/// The single delivery back-end active for a run.
///
/// Resolved once from the raw destination settings. When several are given
/// the Slack app wins over a Google Chat webhook, which wins over a Slack
/// webhook.
#[derive(Clone, Eq, PartialEq)]
pub enum NotificationMode {
    /// No notifications are sent.
    Disabled,

    /// Slack Web API with a bot token. Supports threads and reactions.
    SlackApp {
        /// Channel id to post into.
        channel: String,

        /// Bot token.
        token: String,
    },

    /// Slack incoming webhook. Plain messages only.
    SlackWebhook {
        /// Webhook URL.
        url: String,
    },

    /// Google Chat space webhook. Plain messages only.
    GoogleChat {
        /// Webhook URL.
        url: String,
    },
}

impl NotificationMode {
    /// Picks the delivery back-end from the configured destinations. Empty
    /// strings count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingChannel`] if a Slack token is set without a
    /// channel id.
    pub fn resolve(
        channel: Option<&str>,
        token: Option<&str>,
        webhook: Option<&str>,
    ) -> Result<Self> {
        let channel = channel.filter(|c| !c.is_empty());
        let token = token.filter(|t| !t.is_empty());
        let webhook = webhook.filter(|w| !w.is_empty());

        if let Some(token) = token {
            let channel = channel.ok_or(Error::MissingChannel)?;
            return Ok(Self::SlackApp {
                channel: channel.to_string(),
                token: token.to_string(),
            });
        }

        Ok(match webhook {
            Some(url) if url.starts_with(GOOGLE_CHAT_PREFIX) => Self::GoogleChat {
                url: url.to_string(),
            },
            Some(url) => Self::SlackWebhook {
                url: url.to_string(),
            },
            None => Self::Disabled,
        })
    }

    /// Short name of the mode for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::SlackApp { .. } => "slack-app",
            Self::SlackWebhook { .. } => "slack-webhook",
            Self::GoogleChat { .. } => "google-chat",
        }
    }
}

// Keep tokens and webhook secrets out of logs.
impl fmt::Debug for NotificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SlackApp { channel, .. } => f
                .debug_struct("SlackApp")
                .field("channel", channel)
                .field("token", &"<redacted>")
                .finish(),
            _ => f.write_str(self.name()),
        }
    }
}

impl fmt::Display for NotificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static GCHAT: &str = "https://chat.googleapis.com/v1/spaces/AAAA/messages?key=k";
    static SLACK_HOOK: &str = "https://hooks.slack.com/services/T0/B0/x";

    #[test]
    fn test_nothing_configured_is_disabled() {
        let mode = NotificationMode::resolve(None, None, None).unwrap();
        assert_eq!(mode, NotificationMode::Disabled);

        let mode = NotificationMode::resolve(Some(""), Some(""), Some("")).unwrap();
        assert_eq!(mode, NotificationMode::Disabled);
    }

    #[test]
    fn test_slack_app_beats_any_webhook() {
        let mode = NotificationMode::resolve(Some("C0FAKE"), Some("xoxb-1"), Some(GCHAT)).unwrap();

        assert_eq!(
            mode,
            NotificationMode::SlackApp {
                channel: "C0FAKE".to_string(),
                token: "xoxb-1".to_string(),
            }
        );
    }

    #[test]
    fn test_token_without_channel_is_rejected() {
        let err = NotificationMode::resolve(None, Some("xoxb-1"), Some(SLACK_HOOK)).unwrap_err();
        assert!(matches!(err, Error::MissingChannel));
    }

    #[test]
    fn test_webhook_host_selects_backend() {
        let gchat = NotificationMode::resolve(Some("C0FAKE"), None, Some(GCHAT)).unwrap();
        assert_eq!(gchat.name(), "google-chat");

        let slack = NotificationMode::resolve(None, None, Some(SLACK_HOOK)).unwrap();
        assert_eq!(
            slack,
            NotificationMode::SlackWebhook {
                url: SLACK_HOOK.to_string()
            }
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let mode = NotificationMode::resolve(Some("C0FAKE"), Some("xoxb-secret"), None).unwrap();
        let rendered = format!("{mode:?}");

        assert!(rendered.contains("C0FAKE"));
        assert!(!rendered.contains("xoxb-secret"));
    }
}
