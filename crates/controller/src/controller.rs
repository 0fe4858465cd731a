use crate::config::LifecycleConfig;
use crate::error::{Error, Result};

use std::fmt;
use std::sync::Arc;

use scuttle_node::{BoxError, NodeActuator};
use scuttle_notify::{Notifier, Phase, ThreadHandle};
use scuttle_termination::TerminationSource;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// Where a controller is in its single, linear run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LifecycleState {
    /// Constructed, not yet run.
    Idle,

    /// Running the start sequence.
    Starting,

    /// Watching for a shutdown trigger.
    Polling,

    /// Running the stop sequence.
    Stopping,

    /// Finished. A controller is never run twice.
    Done,
}

/// What ended the poll loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Trigger {
    /// The run was cancelled, e.g. by SIGTERM.
    Shutdown,

    /// The platform reported a termination notice.
    TermNotice,
}

impl Trigger {
    fn phase(self) -> Phase {
        match self {
            Self::Shutdown => Phase::Shutdown,
            Self::TermNotice => Phase::TermNotice,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Step {
    Uncordon,
    Cordon,
    Drain,
    Delete,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uncordon => "uncordon",
            Self::Cordon => "cordon",
            Self::Drain => "drain",
            Self::Delete => "delete",
        })
    }
}

/// Watches one node for shutdown and tears it down once.
pub struct LifecycleController {
    actuator: Arc<dyn NodeActuator>,
    config: LifecycleConfig,
    notifier: Arc<dyn Notifier>,
    source: Arc<dyn TerminationSource>,
    state: LifecycleState,
    thread: Option<ThreadHandle>,
}

impl LifecycleController {
    /// Creates a controller for `config` using the given collaborators.
    pub fn new(
        config: LifecycleConfig,
        notifier: Arc<dyn Notifier>,
        source: Arc<dyn TerminationSource>,
        actuator: Arc<dyn NodeActuator>,
    ) -> Self {
        Self {
            actuator,
            config,
            notifier,
            source,
            state: LifecycleState::Idle,
            thread: None,
        }
    }

    /// Current position in the run.
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// Conversation the next notification will be linked to.
    #[must_use]
    pub const fn thread(&self) -> Option<&ThreadHandle> {
        self.thread.as_ref()
    }

    /// Runs the start sequence, waits for `shutdown` to be cancelled or a
    /// termination notice, then runs the stop sequence.
    ///
    /// Failures of individual steps are logged and never abort the run.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The controller has already run
    /// - The configured node name is empty
    /// - The configured poll interval is zero
    pub async fn run(&mut self, shutdown: CancellationToken) -> Result<Trigger> {
        if self.state != LifecycleState::Idle {
            return Err(Error::AlreadyRun);
        }
        if self.config.node.is_empty() {
            return Err(Error::MissingNodeName);
        }
        if self.config.poll_interval.is_zero() {
            return Err(Error::ZeroPollInterval);
        }

        let span = info_span!("scuttle", node = %self.config.node);
        let trigger = self.run_once(shutdown).instrument(span).await;

        Ok(trigger)
    }

    async fn run_once(&mut self, shutdown: CancellationToken) -> Trigger {
        info!(
            platform = %self.config.platform,
            source = self.source.name(),
            notifier = self.notifier.name(),
            notification = %self.config.notification,
            "start scuttle"
        );

        self.transition(LifecycleState::Starting);
        self.start().await;

        self.transition(LifecycleState::Polling);
        let trigger = self.watch(&shutdown).await;

        // Teardown is not bound to `shutdown`: it was most likely cancelled
        // already and the stop calls must still complete.
        self.transition(LifecycleState::Stopping);
        self.stop(trigger).await;

        self.transition(LifecycleState::Done);
        trigger
    }

    fn transition(&mut self, next: LifecycleState) {
        debug!(from = ?self.state, to = ?next, "state transition");
        self.state = next;
    }

    async fn start(&mut self) {
        if !self.config.uncordon_on_start {
            info!(step = %Step::Uncordon, "SKIP uncordon node");
            return;
        }

        info!(step = %Step::Uncordon, "uncordon node");
        self.notify(Phase::Uncordon).await;
        let result = self.actuator.uncordon(&self.config.node).await;
        self.settle(Step::Uncordon, result);
    }

    async fn watch(&self, shutdown: &CancellationToken) -> Trigger {
        let period = self.config.poll_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    debug!("tick...");
                    tokio::select! {
                        biased;
                        () = shutdown.cancelled() => break,
                        pending = self.source.is_pending() => {
                            if pending {
                                info!(source = self.source.name(), "termination notice detected");
                                return Trigger::TermNotice;
                            }
                        }
                    }
                }
            }
        }

        info!("stopping...");
        Trigger::Shutdown
    }

    async fn stop(&mut self, trigger: Trigger) {
        self.notify(trigger.phase()).await;

        if self.config.drain_on_stop {
            info!(step = %Step::Drain, "draining node");
            self.notify(Phase::Drain).await;

            let result = self.actuator.cordon(&self.config.node).await;
            self.settle(Step::Cordon, result);

            let result = self.actuator.drain(&self.config.node).await;
            if let Some(reason) = self.settle(Step::Drain, result) {
                self.notify(Phase::Error(reason)).await;
            }
        } else {
            info!(step = %Step::Drain, "SKIP drain node");
        }

        if self.config.delete_on_stop {
            info!(step = %Step::Delete, "deleting node");
            self.notify(Phase::Delete).await;

            let result = self.actuator.delete(&self.config.node).await;
            if let Some(reason) = self.settle(Step::Delete, result) {
                self.notify(Phase::Error(reason)).await;
            }
        } else {
            info!(step = %Step::Delete, "SKIP delete node");
        }
    }

    /// Sends `phase` linked to the current conversation. Adopts any handle the
    /// notifier returns; failures are logged and leave the handle unchanged.
    async fn notify(&mut self, phase: Phase) {
        match self.notifier.notify(&phase, self.thread.as_ref()).await {
            Ok(Some(handle)) => self.thread = Some(handle),
            Ok(None) => {}
            Err(e) => warn!(%phase, error = %e, "notification failed"),
        }
    }

    /// Logs the outcome of a best-effort step. Returns the failure text so the
    /// caller can surface it.
    fn settle(&self, step: Step, result: std::result::Result<(), BoxError>) -> Option<String> {
        match result {
            Ok(()) => {
                debug!(%step, "step complete");
                None
            }
            Err(e) => {
                error!(%step, error = %e, "{step} error");
                Some(e.to_string())
            }
        }
    }
}
