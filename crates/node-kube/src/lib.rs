//! Kubernetes implementation of the node actuator: cordon, uncordon, drain
//! and delete through the cluster API.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod client;
mod cordon;
mod drain;
mod error;

pub use client::client_from_env;
pub use cordon::Cordoner;
pub use drain::{DrainConfig, Drainer};
pub use error::{Error, Result};

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Node;
use kube::Client;
use kube::api::{Api, DeleteParams};
use scuttle_node::{BoxError, NodeActuator};
use tracing::info;

/// Node actuator backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeNode {
    cordoner: Cordoner,
    drainer: Drainer,
    nodes: Api<Node>,
}

impl KubeNode {
    /// Creates an actuator using `client`, bounding drains by `drain`.
    #[must_use]
    pub fn new(client: Client, drain: DrainConfig) -> Self {
        Self {
            cordoner: Cordoner::new(client.clone()),
            drainer: Drainer::new(client.clone(), drain),
            nodes: Api::all(client),
        }
    }

    /// Deletes the `Node` object. A node that is already gone counts as
    /// deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete request fails for any other reason.
    pub async fn delete_node(&self, node: &str) -> Result<()> {
        match self.nodes.delete(node, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(e)) if e.code == 404 => {
                info!(node, "node already deleted");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl NodeActuator for KubeNode {
    async fn cordon(&self, node: &str) -> std::result::Result<(), BoxError> {
        Ok(self.cordoner.cordon(node).await?)
    }

    async fn uncordon(&self, node: &str) -> std::result::Result<(), BoxError> {
        Ok(self.cordoner.uncordon(node).await?)
    }

    async fn drain(&self, node: &str) -> std::result::Result<(), BoxError> {
        Ok(self.drainer.drain(node).await?)
    }

    async fn delete(&self, node: &str) -> std::result::Result<(), BoxError> {
        info!(node, "deleting node");
        Ok(self.delete_node(node).await?)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Requests, client_for, failure};

    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::delete;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    async fn node_gone(
        State(requests): State<Requests>,
        Path(name): Path<String>,
    ) -> (StatusCode, Json<Value>) {
        requests.push(format!("delete {name}"), Value::Null);
        (StatusCode::NOT_FOUND, Json(failure(404, "NotFound")))
    }

    async fn node_forbidden() -> (StatusCode, Json<Value>) {
        (StatusCode::FORBIDDEN, Json(failure(403, "Forbidden")))
    }

    async fn node_deleted(Path(name): Path<String>) -> Json<Value> {
        Json(json!({
            "apiVersion": "v1",
            "kind": "Node",
            "metadata": { "name": name },
        }))
    }

    async fn actuator(router: Router) -> KubeNode {
        KubeNode::new(client_for(router).await, DrainConfig::default())
    }

    #[tokio::test]
    async fn test_delete_missing_node_succeeds() {
        let requests = Requests::default();
        let app = Router::new()
            .route("/api/v1/nodes/{name}", delete(node_gone))
            .with_state(requests.clone());
        let node = actuator(app).await;

        node.delete("worker-1").await.unwrap();

        assert_eq!(requests.labels(), vec!["delete worker-1".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_existing_node() {
        let app = Router::new().route("/api/v1/nodes/{name}", delete(node_deleted));
        let node = actuator(app).await;

        node.delete_node("worker-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_refused_is_an_error() {
        let app = Router::new().route("/api/v1/nodes/{name}", delete(node_forbidden));
        let node = actuator(app).await;

        let err = node.delete_node("worker-1").await.unwrap_err();

        assert!(matches!(err, Error::Kube(kube::Error::Api(ref e)) if e.code == 403));
    }
}
