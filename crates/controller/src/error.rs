use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("controller has already run")]
    AlreadyRun,

    #[error("node name must be set (use --node or $HOSTNAME)")]
    MissingNodeName,

    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
}
