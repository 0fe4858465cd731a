use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// In-cluster service account configuration could not be loaded.
    #[error("error getting in-cluster Kubernetes config: {0}")]
    InCluster(#[from] kube::config::InClusterError),

    #[error(transparent)]
    Kube(#[from] kube::Error),

    /// Kubeconfig named by `$KUBECONFIG` could not be loaded.
    #[error("error loading kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("drain of node {node} did not finish within {timeout:?}")]
    DrainTimeout { node: String, timeout: Duration },

    #[error("failed to evict pods: {}", .0.join(", "))]
    Eviction(Vec<String>),
}
