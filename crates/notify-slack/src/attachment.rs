use chrono::{DateTime, Local};
use scuttle_notify::Phase;
use serde::Serialize;

/// A legacy Slack message attachment.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Attachment {
    /// Sidebar colour keyword.
    pub color: &'static str,

    /// Message body.
    pub text: String,

    /// Human readable send time.
    pub footer: String,

    /// Send time in Unix seconds.
    pub ts: i64,
}

impl Attachment {
    /// Renders `phase` for `node` at the current local time.
    #[must_use]
    pub fn for_phase(node: &str, phase: &Phase) -> Self {
        Self::at(node, phase, Local::now())
    }

    pub(crate) fn at(node: &str, phase: &Phase, now: DateTime<Local>) -> Self {
        Self {
            color: phase.color().as_str(),
            text: phase.message(&format!("`{node}`")),
            footer: now.format("%b %e %H:%M:%S%.3f").to_string(),
            ts: now.timestamp(),
        }
    }
}
