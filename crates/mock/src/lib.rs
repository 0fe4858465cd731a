//! Recording mocks of the notifier, termination source and node actuator.
//!
//! Every mock built from the same [`Journal`] appends to one ordered call log,
//! so tests can assert on the interleaving of notifications, polls and node
//! mutations.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

pub use error::Error;

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use scuttle_node::NodeActuator;
use scuttle_notify::{BoxError, Notifier, Phase, ThreadHandle};
use scuttle_termination::TerminationSource;

/// A node mutation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Action {
    /// `NodeActuator::cordon`
    Cordon,

    /// `NodeActuator::uncordon`
    Uncordon,

    /// `NodeActuator::drain`
    Drain,

    /// `NodeActuator::delete`
    Delete,
}

/// A recorded collaborator call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Call {
    /// A notification, with the thread handle it was linked to.
    Notify {
        /// Phase announced.
        phase: Phase,

        /// Handle passed in.
        thread: Option<ThreadHandle>,
    },

    /// A termination poll.
    Poll,

    /// A node mutation on the named node.
    Node(Action, String),
}

/// Shared, ordered log of collaborator calls.
#[derive(Clone, Debug, Default)]
pub struct Journal(Arc<Mutex<Vec<Call>>>);

impl Journal {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: Call) {
        self.0.lock().push(call);
    }

    /// Snapshot of every call so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().clone()
    }

    /// Number of polls recorded.
    #[must_use]
    pub fn polls(&self) -> usize {
        self.0.lock().iter().filter(|c| **c == Call::Poll).count()
    }

    /// Number of times `action` was attempted.
    #[must_use]
    pub fn attempts(&self, action: Action) -> usize {
        self.0
            .lock()
            .iter()
            .filter(|c| matches!(c, Call::Node(a, _) if *a == action))
            .count()
    }

    /// Phases notified, in order.
    #[must_use]
    pub fn phases(&self) -> Vec<Phase> {
        self.0
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Notify { phase, .. } => Some(phase.clone()),
                _ => None,
            })
            .collect()
    }

    /// Every call except polls, in order.
    #[must_use]
    pub fn without_polls(&self) -> Vec<Call> {
        self.0
            .lock()
            .iter()
            .filter(|c| **c != Call::Poll)
            .cloned()
            .collect()
    }
}

/// Notifier that records each call and hands out queued thread handles.
pub struct MockNotifier {
    failing: bool,
    handles: Mutex<VecDeque<ThreadHandle>>,
    journal: Journal,
}

impl MockNotifier {
    /// A notifier that succeeds and returns no handles.
    #[must_use]
    pub fn new(journal: &Journal) -> Self {
        Self {
            failing: false,
            handles: Mutex::new(VecDeque::new()),
            journal: journal.clone(),
        }
    }

    /// Returns `handles` from successive calls, then `None`.
    #[must_use]
    pub fn returning<I, S>(mut self, handles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.handles = Mutex::new(handles.into_iter().map(ThreadHandle::new).collect());
        self
    }

    /// Every call fails after being recorded.
    #[must_use]
    pub const fn failing(mut self) -> Self {
        self.failing = true;
        self
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn notify(
        &self,
        phase: &Phase,
        thread: Option<&ThreadHandle>,
    ) -> Result<Option<ThreadHandle>, BoxError> {
        self.journal.record(Call::Notify {
            phase: phase.clone(),
            thread: thread.cloned(),
        });

        if self.failing {
            return Err(Error::Injected("notify").into());
        }

        Ok(self.handles.lock().pop_front())
    }
}

/// Termination source that reports a notice on a chosen poll, or never.
pub struct MockTermination {
    journal: Journal,
    pending_on: Option<usize>,
    polls: AtomicUsize,
}

impl MockTermination {
    /// Never reports a notice.
    #[must_use]
    pub fn never(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            pending_on: None,
            polls: AtomicUsize::new(0),
        }
    }

    /// Reports a notice from the `n`th poll onwards (1-based).
    #[must_use]
    pub fn pending_on(journal: &Journal, n: usize) -> Self {
        Self {
            pending_on: Some(n),
            ..Self::never(journal)
        }
    }
}

#[async_trait]
impl TerminationSource for MockTermination {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn is_pending(&self) -> bool {
        self.journal.record(Call::Poll);
        let poll = self.polls.fetch_add(1, Ordering::SeqCst) + 1;

        self.pending_on.is_some_and(|n| poll >= n)
    }
}

/// Node actuator that records each mutation and can fail chosen ones.
pub struct MockNode {
    failing: HashSet<Action>,
    journal: Journal,
}

impl MockNode {
    /// An actuator whose mutations all succeed.
    #[must_use]
    pub fn new(journal: &Journal) -> Self {
        Self {
            failing: HashSet::new(),
            journal: journal.clone(),
        }
    }

    /// Makes `action` fail after being recorded.
    #[must_use]
    pub fn failing(mut self, action: Action) -> Self {
        self.failing.insert(action);
        self
    }

    fn act(&self, action: Action, node: &str) -> Result<(), BoxError> {
        self.journal.record(Call::Node(action, node.to_string()));

        if self.failing.contains(&action) {
            return Err(Error::Action(action, node.to_string()).into());
        }

        Ok(())
    }
}

#[async_trait]
impl NodeActuator for MockNode {
    async fn cordon(&self, node: &str) -> Result<(), BoxError> {
        self.act(Action::Cordon, node)
    }

    async fn uncordon(&self, node: &str) -> Result<(), BoxError> {
        self.act(Action::Uncordon, node)
    }

    async fn drain(&self, node: &str) -> Result<(), BoxError> {
        self.act(Action::Drain, node)
    }

    async fn delete(&self, node: &str) -> Result<(), BoxError> {
        self.act(Action::Delete, node)
    }
}
