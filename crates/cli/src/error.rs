use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Controller(#[from] scuttle_controller::Error),

    #[error(transparent)]
    GoogleChat(#[from] scuttle_notify_gchat::Error),

    #[error(transparent)]
    Imds(#[from] scuttle_imds::Error),

    #[error("invalid log-level: {0:?}")]
    InvalidLogLevel(String),

    /// IO operation failed.
    #[error("{0}: {1}")]
    Io(&'static str, #[source] std::io::Error),

    #[error("error creating Kubernetes client: {0}")]
    Kube(#[from] scuttle_node_kube::Error),

    #[error(transparent)]
    Notify(#[from] scuttle_notify::Error),

    #[error(transparent)]
    Slack(#[from] scuttle_notify_slack::Error),
}
