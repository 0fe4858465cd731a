//! Lifecycle controller: uncordons a node on start, watches for an impending
//! shutdown, then cordons, drains and deletes it.
//!
//! The run is strictly linear (`Idle → Starting → Polling → Stopping → Done`)
//! and every remote step is best-effort: a failure is logged, optionally
//! announced, and the sequence carries on.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod config;
mod controller;
mod error;

pub use config::{DEFAULT_POLL_INTERVAL, LifecycleConfig};
pub use controller::{LifecycleController, LifecycleState, Trigger};
pub use error::{Error, Result};
