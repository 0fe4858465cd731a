//! Abstract interface for mutating a cluster node during its lifecycle.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use async_trait::async_trait;

/// Boxed error returned across the actuator seam.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Best-effort node mutations. Each call is a single remote operation that is
/// safe to repeat on a node already in the requested state.
#[async_trait]
pub trait NodeActuator
where
    Self: Send + Sync + 'static,
{
    /// Mark the node unschedulable.
    async fn cordon(&self, node: &str) -> Result<(), BoxError>;

    /// Mark the node schedulable.
    async fn uncordon(&self, node: &str) -> Result<(), BoxError>;

    /// Evict the node's workloads. Must enforce its own time bound.
    async fn drain(&self, node: &str) -> Result<(), BoxError>;

    /// Remove the node object from the cluster.
    async fn delete(&self, node: &str) -> Result<(), BoxError>;
}
