use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("a Slack channel id is required when a Slack token is set")]
    MissingChannel,
}
