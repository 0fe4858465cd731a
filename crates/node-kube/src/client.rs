use crate::error::Result;

use kube::Client;
use kube::config::{Config, KubeConfigOptions, Kubeconfig};
use tracing::info;

/// Creates a Kubernetes client from the kubeconfig named by `$KUBECONFIG`,
/// or from the pod's service account when it is unset.
///
/// # Errors
///
/// Returns an error if neither configuration source can be loaded or the
/// client cannot be built from it.
pub async fn client_from_env() -> Result<Client> {
    let config = match std::env::var_os("KUBECONFIG").filter(|path| !path.is_empty()) {
        Some(path) => {
            info!(kubeconfig = ?path, "using kubeconfig");
            let kubeconfig = Kubeconfig::read_from(&path)?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?
        }
        None => {
            info!("using in-cluster service account");
            Config::incluster()?
        }
    };

    Ok(Client::try_from(config)?)
}
