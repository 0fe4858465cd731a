use crate::error::Result;

use std::sync::Arc;

use scuttle_imds::MetadataPoller;
use scuttle_notify::{DisabledNotifier, NotificationMode, Notifier};
use scuttle_notify_gchat::GoogleChatNotifier;
use scuttle_notify_slack::{SlackAppNotifier, SlackWebhookNotifier};
use scuttle_termination::{NeverTerminates, Platform, TerminationSource};

/// Builds the delivery back-end selected by `mode`.
pub fn notifier(mode: &NotificationMode, node: &str) -> Result<Arc<dyn Notifier>> {
    Ok(match mode {
        NotificationMode::Disabled => Arc::new(DisabledNotifier),
        NotificationMode::SlackApp { channel, token } => {
            Arc::new(SlackAppNotifier::new(node, channel.as_str(), token.as_str())?)
        }
        NotificationMode::SlackWebhook { url } => {
            Arc::new(SlackWebhookNotifier::new(node, url.as_str())?)
        }
        NotificationMode::GoogleChat { url } => {
            Arc::new(GoogleChatNotifier::new(node, url.as_str())?)
        }
    })
}

/// Builds the termination source for `platform`.
pub fn termination_source(platform: Platform) -> Result<Arc<dyn TerminationSource>> {
    Ok(match platform {
        Platform::None => Arc::new(NeverTerminates),
        platform => Arc::new(MetadataPoller::new(platform)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifier_per_mode() {
        let cases = [
            (NotificationMode::Disabled, "disabled"),
            (
                NotificationMode::SlackApp {
                    channel: "C0FAKE".to_string(),
                    token: "xoxb-1".to_string(),
                },
                "slack-app",
            ),
            (
                NotificationMode::SlackWebhook {
                    url: "https://hooks.slack.com/services/x".to_string(),
                },
                "slack-webhook",
            ),
            (
                NotificationMode::GoogleChat {
                    url: "https://chat.googleapis.com/v1/spaces/x".to_string(),
                },
                "google-chat",
            ),
        ];

        for (mode, name) in cases {
            assert_eq!(notifier(&mode, "worker-1").unwrap().name(), name);
        }
    }

    #[test]
    fn test_termination_source_per_platform() {
        assert_eq!(termination_source(Platform::None).unwrap().name(), "none");
        assert_eq!(termination_source(Platform::Aws).unwrap().name(), "aws");
        assert_eq!(termination_source(Platform::Azure).unwrap().name(), "azure");
    }
}
