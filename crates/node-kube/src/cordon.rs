use crate::error::Result;

use k8s_openapi::api::core::v1::Node;
use kube::api::{Api, Patch, PatchParams};
use kube::Client;
use serde_json::json;
use tracing::info;

/// Toggles a node's `spec.unschedulable` flag.
#[derive(Clone)]
pub struct Cordoner {
    nodes: Api<Node>,
}

impl Cordoner {
    /// Creates a cordoner using `client`.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            nodes: Api::all(client),
        }
    }

    /// Marks `node` as unschedulable.
    ///
    /// # Errors
    ///
    /// Returns an error if the patch request fails.
    pub async fn cordon(&self, node: &str) -> Result<()> {
        info!(node, "cordoning node");
        self.set_unschedulable(node, true).await
    }

    /// Marks `node` as schedulable.
    ///
    /// # Errors
    ///
    /// Returns an error if the patch request fails.
    pub async fn uncordon(&self, node: &str) -> Result<()> {
        info!(node, "uncordoning node");
        self.set_unschedulable(node, false).await
    }

    async fn set_unschedulable(&self, node: &str, unschedulable: bool) -> Result<()> {
        let patch = json!({ "spec": { "unschedulable": unschedulable } });
        self.nodes
            .patch(node, &PatchParams::default(), &Patch::Strategic(&patch))
            .await?;

        Ok(())
    }
}
