//! Built-in handlers for the control plane's background jobs.
//!
//! Thin glue between claimed tasks and the repository layer: each handler
//! unpacks its payload, invokes the matching [`Repository`] operation and
//! maps the result onto the retry/archive state machine. All of them are
//! idempotent — deleting something already gone is success, and the BMC
//! handler re-pushes the same command under the same command ID.

mod delete;
pub use delete::{IpDeleteHandler, MachineAllocationHandler, MachineDeleteHandler, NetworkDeleteHandler};

mod bmc;
pub use bmc::BmcCommandHandler;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use ferro_bus::Queue;
use ferro_model::{BmcCommand, IpDelete, MachineAllocation, MachineDelete, NetworkDelete};

use crate::{HandlerError, HandlerRegistry, RegistryError};

/// Errors raised by the repository layer.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RepoError {
    /// The entity does not exist (possibly deleted by an earlier attempt).
    #[error("not found")]
    NotFound,

    /// The operation cannot succeed regardless of retries.
    #[error("invalid: {0}")]
    Invalid(String),

    /// The repository failed transiently.
    #[error("{0}")]
    Internal(String),
}

impl From<RepoError> for HandlerError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Invalid(msg) => HandlerError::Fatal(msg),
            other => HandlerError::Fail(other.to_string()),
        }
    }
}

/// Port onto the persistence layer the handlers mutate.
///
/// The implementations live with the repository; this core only dispatches
/// into them.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn delete_ip(&self, allocation_id: &str, ip: &str, project: &str)
    -> Result<(), RepoError>;

    async fn delete_network(&self, network_id: &str) -> Result<(), RepoError>;

    async fn delete_machine(
        &self,
        machine_id: Option<&str>,
        allocation_id: Option<&str>,
    ) -> Result<(), RepoError>;

    async fn allocate_machine(
        &self,
        allocation_id: &str,
        machine_id: &str,
        project: &str,
    ) -> Result<(), RepoError>;
}

/// Builds the registry with every built-in task kind wired up.
///
/// Servers constructed from this registry can dispatch everything the
/// factory operations on the client enqueue.
pub fn control_plane_registry(
    repo: Arc<dyn Repository>,
    queue: Arc<Queue>,
) -> Result<HandlerRegistry, RegistryError> {
    let mut registry = HandlerRegistry::new();
    registry.register::<IpDelete, _>(IpDeleteHandler::new(repo.clone()))?;
    registry.register::<NetworkDelete, _>(NetworkDeleteHandler::new(repo.clone()))?;
    registry.register::<MachineDelete, _>(MachineDeleteHandler::new(repo.clone()))?;
    registry.register::<MachineAllocation, _>(MachineAllocationHandler::new(repo))?;
    registry.register::<BmcCommand, _>(BmcCommandHandler::new(queue))?;
    Ok(registry)
}
