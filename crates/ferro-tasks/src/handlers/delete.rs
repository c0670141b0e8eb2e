use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use ferro_model::{IpDelete, MachineAllocation, MachineDelete, NetworkDelete};

use crate::{Handler, HandlerError};

use super::{RepoError, Repository};

/// Deleting an entity that is already gone is success: redelivery after a
/// crashed worker must not archive the task.
fn idempotent(result: Result<(), RepoError>) -> Result<(), HandlerError> {
    match result {
        Ok(()) | Err(RepoError::NotFound) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Releases an IP allocation.
pub struct IpDeleteHandler {
    repo: Arc<dyn Repository>,
}

impl IpDeleteHandler {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Handler<IpDelete> for IpDeleteHandler {
    async fn handle(&self, _token: CancellationToken, task: IpDelete) -> Result<(), HandlerError> {
        debug!(ip = %task.ip, project = %task.project, "deleting ip");
        idempotent(
            self.repo
                .delete_ip(&task.allocation_id, &task.ip, &task.project)
                .await,
        )
    }
}

/// Removes a network.
pub struct NetworkDeleteHandler {
    repo: Arc<dyn Repository>,
}

impl NetworkDeleteHandler {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Handler<NetworkDelete> for NetworkDeleteHandler {
    async fn handle(
        &self,
        _token: CancellationToken,
        task: NetworkDelete,
    ) -> Result<(), HandlerError> {
        debug!(network = %task.network_id, "deleting network");
        idempotent(self.repo.delete_network(&task.network_id).await)
    }
}

/// Removes a machine and/or its allocation.
pub struct MachineDeleteHandler {
    repo: Arc<dyn Repository>,
}

impl MachineDeleteHandler {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Handler<MachineDelete> for MachineDeleteHandler {
    async fn handle(
        &self,
        _token: CancellationToken,
        task: MachineDelete,
    ) -> Result<(), HandlerError> {
        debug!(
            machine = task.machine_id.as_deref().unwrap_or("-"),
            allocation = task.allocation_id.as_deref().unwrap_or("-"),
            "deleting machine"
        );
        idempotent(
            self.repo
                .delete_machine(task.machine_id.as_deref(), task.allocation_id.as_deref())
                .await,
        )
    }
}

/// Drives the machine allocation workflow.
pub struct MachineAllocationHandler {
    repo: Arc<dyn Repository>,
}

impl MachineAllocationHandler {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Handler<MachineAllocation> for MachineAllocationHandler {
    async fn handle(
        &self,
        _token: CancellationToken,
        task: MachineAllocation,
    ) -> Result<(), HandlerError> {
        debug!(machine = %task.machine_id, allocation = %task.allocation_id, "allocating machine");
        self.repo
            .allocate_machine(&task.allocation_id, &task.machine_id, &task.project)
            .await
            .map_err(HandlerError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRepo {
        deleted_ips: Mutex<Vec<String>>,
        missing: bool,
    }

    #[async_trait]
    impl Repository for RecordingRepo {
        async fn delete_ip(&self, _: &str, ip: &str, _: &str) -> Result<(), RepoError> {
            if self.missing {
                return Err(RepoError::NotFound);
            }
            self.deleted_ips.lock().unwrap().push(ip.to_string());
            Ok(())
        }
        async fn delete_network(&self, _: &str) -> Result<(), RepoError> {
            Err(RepoError::Internal("db down".to_string()))
        }
        async fn delete_machine(
            &self,
            _: Option<&str>,
            _: Option<&str>,
        ) -> Result<(), RepoError> {
            Ok(())
        }
        async fn allocate_machine(&self, _: &str, _: &str, _: &str) -> Result<(), RepoError> {
            Ok(())
        }
    }

    fn ip_task() -> IpDelete {
        IpDelete {
            allocation_id: "a-1".to_string(),
            ip: "10.0.0.4".to_string(),
            project: "p-1".to_string(),
        }
    }

    #[tokio::test]
    async fn delete_invokes_the_repository() {
        let repo = Arc::new(RecordingRepo::default());
        let handler = IpDeleteHandler::new(repo.clone());

        handler
            .handle(CancellationToken::new(), ip_task())
            .await
            .unwrap();
        assert_eq!(*repo.deleted_ips.lock().unwrap(), vec!["10.0.0.4"]);
    }

    #[tokio::test]
    async fn already_deleted_is_success() {
        let repo = Arc::new(RecordingRepo {
            missing: true,
            ..Default::default()
        });
        let handler = IpDeleteHandler::new(repo);

        let res = handler.handle(CancellationToken::new(), ip_task()).await;
        assert!(res.is_ok());
    }

    #[tokio::test]
    async fn transient_repo_failure_is_retryable() {
        let repo = Arc::new(RecordingRepo::default());
        let handler = NetworkDeleteHandler::new(repo);

        let err = handler
            .handle(
                CancellationToken::new(),
                NetworkDelete {
                    network_id: "net-1".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
