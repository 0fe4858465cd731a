//! Abstract interface for detecting an impending involuntary shutdown of the
//! instance backing a node.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

pub use error::{Error, Result};

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

/// Cloud platform whose termination notices should be watched.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Platform {
    /// No cloud platform. Only process signals end a run.
    #[default]
    None,

    /// AWS spot instance interruption notices.
    Aws,

    /// Azure scheduled events.
    Azure,
}

impl Platform {
    /// Lowercase name as accepted on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Aws => "aws",
            Self::Azure => "azure",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "aws" => Ok(Self::Aws),
            "azure" => Ok(Self::Azure),
            other => Err(Error::UnknownPlatform(other.to_string())),
        }
    }
}

/// Answers whether a shutdown notice is currently pending.
#[async_trait]
pub trait TerminationSource
where
    Self: Send + Sync + 'static,
{
    /// Name of the source for logging.
    fn name(&self) -> &'static str;

    /// Returns `true` if a shutdown notice is pending.
    ///
    /// Implementations must return within a short, bounded time and treat
    /// slow, unreachable or failing endpoints as "not pending".
    async fn is_pending(&self) -> bool;
}

/// Source used when no platform is configured. Never reports a notice and
/// performs no I/O.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverTerminates;

#[async_trait]
impl TerminationSource for NeverTerminates {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn is_pending(&self) -> bool {
        false
    }
}
