use crate::error::{Error, Result};

use std::time::Duration;

use futures::future::join_all;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, DeleteParams, EvictParams, ListParams};
use kube::{Client, ResourceExt};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

/// Annotation carried by the API server's copy of a static pod.
static MIRROR_POD_ANNOTATION: &str = "kubernetes.io/config.mirror";

/// Wait between eviction attempts refused by a disruption budget.
const EVICTION_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Wait between checks that an evicted pod is gone.
const DELETION_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Bounds on a node drain.
#[derive(Clone, Debug)]
pub struct DrainConfig {
    /// Termination grace period passed with each eviction. `None` keeps the
    /// pod's own setting.
    pub grace_period: Option<Duration>,

    /// Upper bound on the whole drain.
    pub timeout: Duration,
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            grace_period: None,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Why a pod on a draining node is left alone, if it is.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Disposition {
    Evict,
    SkipDaemonSet,
    SkipMirror,
    SkipTerminal,
}

pub(crate) fn disposition(pod: &Pod) -> Disposition {
    let phase = pod.status.as_ref().and_then(|status| status.phase.as_deref());
    if matches!(phase, Some("Succeeded" | "Failed")) {
        return Disposition::SkipTerminal;
    }

    if pod.annotations().contains_key(MIRROR_POD_ANNOTATION) {
        return Disposition::SkipMirror;
    }

    let daemonset_owned = pod
        .owner_references()
        .iter()
        .any(|owner| owner.kind == "DaemonSet" && owner.controller == Some(true));
    if daemonset_owned {
        return Disposition::SkipDaemonSet;
    }

    Disposition::Evict
}

pub(crate) fn eviction_params(grace_period: Option<Duration>) -> EvictParams {
    EvictParams {
        delete_options: grace_period.map(|grace| DeleteParams {
            grace_period_seconds: Some(u32::try_from(grace.as_secs()).unwrap_or(u32::MAX)),
            ..DeleteParams::default()
        }),
        ..EvictParams::default()
    }
}

/// Evicts every evictable pod from a node through the Eviction API, so pod
/// disruption budgets are honoured. Pods owned by a `DaemonSet`, mirror pods
/// and pods that already finished are skipped. Local `emptyDir` data is
/// discarded with its pod.
#[derive(Clone)]
pub struct Drainer {
    client: Client,
    config: DrainConfig,
}

impl Drainer {
    /// Creates a drainer using `client`.
    #[must_use]
    pub const fn new(client: Client, config: DrainConfig) -> Self {
        Self { client, config }
    }

    /// Drains `node`, waiting for evicted pods to terminate.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The node's pods cannot be listed
    /// - Any pod could not be evicted
    /// - The drain exceeds the configured timeout
    pub async fn drain(&self, node: &str) -> Result<()> {
        timeout(self.config.timeout, self.evict_all(node))
            .await
            .map_err(|_| Error::DrainTimeout {
                node: node.to_string(),
                timeout: self.config.timeout,
            })?
    }

    async fn evict_all(&self, node: &str) -> Result<()> {
        let pods: Api<Pod> = Api::all(self.client.clone());
        let listed = pods
            .list(&ListParams::default().fields(&format!("spec.nodeName={node}")))
            .await?;

        let mut targets = Vec::new();
        for pod in listed {
            match disposition(&pod) {
                Disposition::Evict => targets.push(pod),
                skipped => debug!(pod = %pod.name_any(), ?skipped, "skipping pod"),
            }
        }

        info!(node, pods = targets.len(), "evicting pods");

        let outcomes = join_all(targets.iter().map(|pod| self.evict_and_wait(pod))).await;

        let failed: Vec<String> = targets
            .iter()
            .zip(outcomes)
            .filter_map(|(pod, outcome)| {
                outcome.err().map(|e| {
                    warn!(pod = %pod.name_any(), error = %e, "eviction failed");
                    format!("{}/{}", pod.namespace().unwrap_or_default(), pod.name_any())
                })
            })
            .collect();

        if failed.is_empty() {
            Ok(())
        } else {
            Err(Error::Eviction(failed))
        }
    }

    async fn evict_and_wait(&self, pod: &Pod) -> Result<()> {
        let name = pod.name_any();
        let uid = pod.uid();
        let api: Api<Pod> = Api::namespaced(
            self.client.clone(),
            &pod.namespace().unwrap_or_default(),
        );
        let params = eviction_params(self.config.grace_period);

        loop {
            match api.evict(&name, &params).await {
                Ok(_) => break,
                Err(kube::Error::Api(e)) if e.code == 404 => return Ok(()),
                Err(kube::Error::Api(e)) if e.code == 429 => {
                    debug!(pod = %name, "eviction blocked by disruption budget, retrying");
                    sleep(EVICTION_RETRY_INTERVAL).await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        loop {
            match api.get_opt(&name).await? {
                None => break,
                Some(current) if current.uid() != uid => break,
                Some(_) => sleep(DELETION_POLL_INTERVAL).await,
            }
        }

        debug!(pod = %name, "pod evicted");
        Ok(())
    }
}
