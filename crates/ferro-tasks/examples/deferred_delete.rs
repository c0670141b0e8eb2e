//! End-to-end demo against the in-memory store: enqueue deferred deletions
//! and a BMC command, run a worker pool, inspect the outcome.
//!
//! Run with: `cargo run --example deferred_delete`

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;

use ferro_bus::{BusConfig, Queue};
use ferro_model::{BmcCommand, BmcOp, IpDelete, NetworkDelete, TaskQuery, TaskState};
use ferro_observe::LoggerConfig;
use ferro_store::MemoryStore;
use ferro_tasks::handlers::{RepoError, Repository, control_plane_registry};
use ferro_tasks::{ServerConfig, TaskClient, TaskServer};

struct DemoRepo;

#[async_trait]
impl Repository for DemoRepo {
    async fn delete_ip(&self, _: &str, ip: &str, project: &str) -> Result<(), RepoError> {
        info!(ip, project, "repo: ip released");
        Ok(())
    }

    async fn delete_network(&self, network_id: &str) -> Result<(), RepoError> {
        info!(network_id, "repo: network removed");
        Ok(())
    }

    async fn delete_machine(
        &self,
        machine_id: Option<&str>,
        allocation_id: Option<&str>,
    ) -> Result<(), RepoError> {
        info!(?machine_id, ?allocation_id, "repo: machine removed");
        Ok(())
    }

    async fn allocate_machine(
        &self,
        allocation_id: &str,
        machine_id: &str,
        _: &str,
    ) -> Result<(), RepoError> {
        info!(allocation_id, machine_id, "repo: machine allocated");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ferro_observe::logger_init(&LoggerConfig::default())?;

    let store = Arc::new(MemoryStore::new());
    let queue = Arc::new(Queue::new(store.clone(), BusConfig::default()));
    let registry = control_plane_registry(Arc::new(DemoRepo), queue.clone())?;

    let token = CancellationToken::new();
    let server = TaskServer::new(
        store.clone(),
        Arc::new(registry),
        ServerConfig {
            poll_timeout: Duration::from_millis(250),
            ..ServerConfig::default()
        },
    );
    let run = {
        let token = token.clone();
        tokio::spawn(async move { server.run(token).await })
    };

    // An agent waiting for commands addressed to its machine.
    let mut agent = queue.wait::<BmcCommand>("m-1", token.clone());

    let client = TaskClient::new(store.clone());
    for i in 0..3 {
        client
            .ip_delete(&IpDelete {
                allocation_id: format!("alloc-{i}"),
                ip: format!("10.0.0.{i}"),
                project: "p-demo".to_string(),
            })
            .await?;
    }
    client
        .network_delete(&NetworkDelete {
            network_id: "net-demo".to_string(),
        })
        .await?;
    client
        .bmc_command(&BmcCommand {
            machine_id: "m-1".to_string(),
            partition: "fra-equ01".to_string(),
            command: BmcOp::PowerCycle,
            issued_at: SystemTime::now(),
            command_id: "c-demo".to_string(),
        })
        .await?;

    let command = agent.recv().await.expect("command delivered");
    info!(command_id = %command.command_id, "agent: received bmc command");

    tokio::time::sleep(Duration::from_secs(1)).await;

    let completed = client
        .list_tasks(TaskState::Completed, &TaskQuery::new())
        .await?;
    info!(retained = completed.total, "completed tasks held by retention");

    token.cancel();
    run.await?;
    Ok(())
}
