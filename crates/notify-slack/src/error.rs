use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Slack answered with `ok: false`.
    #[error("slack {method} failed: {error}")]
    Api {
        method: &'static str,
        error: String,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("slack {0} response carried no message timestamp")]
    MissingTimestamp(&'static str),
}
