//! Binary watching a Kubernetes node for spot termination or shutdown and
//! tearing it down safely.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

mod collaborators;
mod error;

use error::{Error, Result};

use std::sync::Arc;
use std::time::Duration;

use clap::{ArgAction, Parser};
use scuttle_controller::{LifecycleConfig, LifecycleController};
use scuttle_node_kube::{DrainConfig, KubeNode, client_from_env};
use scuttle_notify::NotificationMode;
use scuttle_termination::Platform;
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Kubernetes node name (defaults to $HOSTNAME)
    #[arg(long, env = "HOSTNAME", default_value = "")]
    node: String,

    /// Platform (none, aws, azure) to poll for termination notices
    #[arg(long, default_value_t = Platform::None, env = "SCUTTLE_PLATFORM")]
    platform: Platform,

    /// Uncordon the node on start
    #[arg(
        long,
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        env = "SCUTTLE_UNCORDON"
    )]
    uncordon: bool,

    /// Cordon and drain the node on stop
    #[arg(
        long,
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        env = "SCUTTLE_DRAIN"
    )]
    drain: bool,

    /// Delete the node on stop
    #[arg(
        long,
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        env = "SCUTTLE_DELETE"
    )]
    delete: bool,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", env = "SCUTTLE_LOG_LEVEL")]
    log_level: String,

    /// Slack channel id (e.g. C0FAKEFAKE)
    #[arg(long, env = "SCUTTLE_SLACK_CHANNEL")]
    channel_id: Option<String>,

    /// Slack app token
    #[arg(long, env = "SCUTTLE_SLACK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Slack or Google Chat webhook URL
    #[arg(long, env = "SCUTTLE_WEBHOOK", hide_env_values = true)]
    webhook: Option<String>,

    /// Seconds between termination notice polls
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval_secs: u64,

    /// Upper bound in seconds on draining the node
    #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(u64).range(1..))]
    drain_timeout_secs: u64,

    /// Grace period in seconds given to evicted pods (defaults to each pod's own)
    #[arg(long)]
    grace_period_secs: Option<u64>,
}

impl Args {
    fn log_level(&self) -> Result<tracing::Level> {
        self.log_level
            .parse()
            .map_err(|_| Error::InvalidLogLevel(self.log_level.clone()))
    }

    fn notification_mode(&self) -> Result<NotificationMode> {
        Ok(NotificationMode::resolve(
            self.channel_id.as_deref(),
            self.token.as_deref(),
            self.webhook.as_deref(),
        )?)
    }

    fn lifecycle_config(&self) -> Result<LifecycleConfig> {
        Ok(LifecycleConfig::new(self.node.clone())
            .with_platform(self.platform)
            .with_notification(self.notification_mode()?)
            .with_uncordon_on_start(self.uncordon)
            .with_drain_on_stop(self.drain)
            .with_delete_on_stop(self.delete)
            .with_poll_interval(Duration::from_secs(self.poll_interval_secs)))
    }

    fn drain_config(&self) -> DrainConfig {
        DrainConfig {
            grace_period: self.grace_period_secs.map(Duration::from_secs),
            timeout: Duration::from_secs(self.drain_timeout_secs),
        }
    }
}

/// Cancels `shutdown` on the first SIGINT or SIGTERM.
fn watch_signals(shutdown: CancellationToken) -> Result<()> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| Error::Io("failed to create SIGTERM signal", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| Error::Io("failed to create SIGINT signal", e))?;

    tokio::spawn(async move {
        info!("main: watch for interrupt signals");
        tokio::select! {
            _ = sigterm.recv() => info!("main: received SIGTERM"),
            _ = sigint.recv() => info!("main: received SIGINT"),
        }

        info!("main: detected interrupt");
        shutdown.cancel();
    });

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level()?)
        .init();

    // Installed before construction so an early signal still ends the run.
    let shutdown = CancellationToken::new();
    watch_signals(shutdown.clone())?;

    let config = args.lifecycle_config()?;
    let client = client_from_env().await?;

    let mut controller = LifecycleController::new(
        config.clone(),
        collaborators::notifier(&config.notification, &config.node)?,
        collaborators::termination_source(config.platform)?,
        Arc::new(KubeNode::new(client, args.drain_config())),
    );

    info!("main: starting scuttle");
    controller.run(shutdown).await?;
    info!("done");

    Ok(())
}
