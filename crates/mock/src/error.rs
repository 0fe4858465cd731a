use thiserror::Error;

use crate::Action;

/// Failures injected by the mocks.
#[derive(Debug, Error)]
pub enum Error {
    /// A node mutation configured to fail.
    #[error("injected {0:?} failure on {1}")]
    Action(Action, String),

    /// A collaborator configured to fail every call.
    #[error("injected {0} failure")]
    Injected(&'static str),
}
