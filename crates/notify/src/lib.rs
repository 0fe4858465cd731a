//! Abstract interface for posting node lifecycle notifications to a chat service.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod mode;
mod phase;

pub use error::{Error, Result};
pub use mode::NotificationMode;
pub use phase::{Color, Phase};

use std::fmt;

use async_trait::async_trait;

/// Boxed error returned across the notifier seam.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Opaque token linking a sequence of notifications into one conversation.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ThreadHandle(String);

impl ThreadHandle {
    /// Wraps a back-end specific conversation identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Delivers lifecycle notifications.
#[async_trait]
pub trait Notifier
where
    Self: Send + Sync + 'static,
{
    /// Name of the delivery back-end.
    fn name(&self) -> &'static str;

    /// Posts a notification for `phase`, linked to `thread` when the back-end
    /// supports threading.
    ///
    /// Returns the handle subsequent notifications should be linked to, or
    /// `None` when the back-end has no notion of conversations.
    async fn notify(
        &self,
        phase: &Phase,
        thread: Option<&ThreadHandle>,
    ) -> std::result::Result<Option<ThreadHandle>, BoxError>;
}

/// Notifier used when no destination is configured. Performs no I/O.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn notify(
        &self,
        _phase: &Phase,
        _thread: Option<&ThreadHandle>,
    ) -> std::result::Result<Option<ThreadHandle>, BoxError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_notifier_returns_no_handle() {
        let notifier = DisabledNotifier;
        let thread = ThreadHandle::new("1700000000.000100");

        let handle = notifier
            .notify(&Phase::Drain, Some(&thread))
            .await
            .expect("disabled notifier never fails");

        assert_eq!(handle, None);
    }

    #[test]
    fn test_thread_handle_display() {
        assert_eq!(ThreadHandle::new("abc").to_string(), "abc");
    }
}
