use std::fmt;

/// A node lifecycle phase worth telling someone about.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    /// The node is being made schedulable on start.
    Uncordon,

    /// The cloud platform announced the instance will be reclaimed.
    TermNotice,

    /// The process received an interrupt.
    Shutdown,

    /// Workloads are being evicted from the node.
    Drain,

    /// The node object is being removed from the cluster.
    Delete,

    /// A teardown step failed. Carries the failure text.
    Error(String),
}

/// Severity colour attached to rich notifications.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Color {
    /// Routine, healthy event.
    Good,

    /// The node is going away.
    Warning,

    /// Something failed.
    Danger,
}

impl Color {
    /// The colour keyword understood by chat attachments.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

impl Phase {
    /// Builds an error phase from any displayable failure.
    pub fn error(err: impl fmt::Display) -> Self {
        Self::Error(err.to_string())
    }

    /// Human readable message for this phase. `node` is inserted verbatim so
    /// callers can apply their own markup.
    #[must_use]
    pub fn message(&self, node: &str) -> String {
        match self {
            Self::Uncordon => format!("🐣 Uncordon node {node}"),
            Self::TermNotice => format!("⏱️ Detected spot termination notice for {node}"),
            Self::Shutdown => format!("⚠️ Detected shutdown of {node}"),
            Self::Drain => format!("💧 Draining node {node}"),
            Self::Delete => format!("🪦 Deleting node {node}"),
            Self::Error(reason) => format!("‼️ {reason} ‼️"),
        }
    }

    /// Attachment colour for back-ends that render one.
    #[must_use]
    pub const fn color(&self) -> Color {
        match self {
            Self::Uncordon => Color::Good,
            Self::TermNotice | Self::Shutdown | Self::Drain | Self::Delete => Color::Warning,
            Self::Error(_) => Color::Danger,
        }
    }

    /// Reaction to place on the conversation root, if any.
    #[must_use]
    pub const fn reaction(&self) -> Option<&'static str> {
        match self {
            Self::Drain => Some("droplet"),
            Self::Delete => Some("headstone"),
            Self::Error(_) => Some("red_circle"),
            Self::Uncordon | Self::TermNotice | Self::Shutdown => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uncordon => f.write_str("uncordon"),
            Self::TermNotice => f.write_str("term-notice"),
            Self::Shutdown => f.write_str("shutdown"),
            Self::Drain => f.write_str("drain"),
            Self::Delete => f.write_str("delete"),
            Self::Error(_) => f.write_str("error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_node() {
        assert_eq!(
            Phase::TermNotice.message("worker-1"),
            "⏱️ Detected spot termination notice for worker-1"
        );
        assert_eq!(Phase::Delete.message("`w`"), "🪦 Deleting node `w`");
    }

    #[test]
    fn test_error_message_carries_reason() {
        let phase = Phase::error("eviction refused");

        assert_eq!(phase.message("ignored"), "‼️ eviction refused ‼️");
        assert_eq!(phase.color(), Color::Danger);
        assert_eq!(phase.reaction(), Some("red_circle"));
    }

    #[test]
    fn test_only_teardown_phases_react() {
        assert_eq!(Phase::Uncordon.reaction(), None);
        assert_eq!(Phase::Shutdown.reaction(), None);
        assert_eq!(Phase::Drain.reaction(), Some("droplet"));
        assert_eq!(Phase::Delete.reaction(), Some("headstone"));
        assert_eq!(Phase::Uncordon.color().as_str(), "good");
        assert_eq!(Phase::Drain.color().as_str(), "warning");
    }
}
