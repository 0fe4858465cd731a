use std::time::Duration;

use scuttle_notify::NotificationMode;
use scuttle_termination::Platform;

/// Default wait between termination polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Immutable settings for one controller run.
#[derive(Clone, Debug)]
pub struct LifecycleConfig {
    /// Name of the node being managed.
    pub node: String,

    /// Platform whose termination notices are watched.
    pub platform: Platform,

    /// Notification back-end selected for the run.
    pub notification: NotificationMode,

    /// Uncordon the node before watching.
    pub uncordon_on_start: bool,

    /// Cordon and drain the node on stop.
    pub drain_on_stop: bool,

    /// Delete the node object on stop.
    pub delete_on_stop: bool,

    /// Wait between termination polls.
    pub poll_interval: Duration,
}

impl LifecycleConfig {
    /// Settings for `node` with every step enabled, no platform and
    /// notifications disabled.
    pub fn new(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            platform: Platform::None,
            notification: NotificationMode::Disabled,
            uncordon_on_start: true,
            drain_on_stop: true,
            delete_on_stop: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Sets the watched platform.
    #[must_use]
    pub const fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Sets the notification back-end.
    #[must_use]
    pub fn with_notification(mut self, notification: NotificationMode) -> Self {
        self.notification = notification;
        self
    }

    /// Enables or disables uncordon on start.
    #[must_use]
    pub const fn with_uncordon_on_start(mut self, enabled: bool) -> Self {
        self.uncordon_on_start = enabled;
        self
    }

    /// Enables or disables cordon and drain on stop.
    #[must_use]
    pub const fn with_drain_on_stop(mut self, enabled: bool) -> Self {
        self.drain_on_stop = enabled;
        self
    }

    /// Enables or disables node deletion on stop.
    #[must_use]
    pub const fn with_delete_on_stop(mut self, enabled: bool) -> Self {
        self.delete_on_stop = enabled;
        self
    }

    /// Sets the wait between termination polls.
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}
