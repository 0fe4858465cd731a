//! Slack delivery back-ends for lifecycle notifications.
//!
//! Two modes are supported:
//! - [`SlackAppNotifier`] posts through the Web API with a bot token, replies
//!   into a thread and reacts on the thread root.
//! - [`SlackWebhookNotifier`] posts a plain attachment to an incoming webhook.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod app;
mod attachment;
mod error;
mod webhook;

pub use app::SlackAppNotifier;
pub use attachment::Attachment;
pub use error::{Error, Result};
pub use webhook::SlackWebhookNotifier;

use std::time::Duration;

/// Upper bound on a single Slack request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}
