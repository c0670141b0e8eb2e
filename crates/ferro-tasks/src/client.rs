use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use ferro_model::{
    BmcCommand, IpDelete, MachineAllocation, MachineDelete, NetworkDelete, TaskId, TaskInfo,
    TaskKind, TaskOptions, TaskPage, TaskPayload, TaskQuery, TaskState, kind,
};
use ferro_store::{NewTask, TaskLedger};

use crate::TaskError;

const DEFAULT_QUEUE: &str = "default";

/// BMC commands finish fast or not at all.
const BMC_TIMEOUT: Duration = Duration::from_secs(60);

/// Completed BMC commands are kept for a month so operators can audit what
/// was issued against a machine.
const BMC_RETENTION: Duration = Duration::from_secs(30 * 24 * 3600);

/// Producer and inspector side of the durable task system.
///
/// The factory operations fix the task kind and apply per-type defaults; the
/// generic [`enqueue`](TaskClient::enqueue) accepts any registered payload
/// type with explicit options. Inspector operations read the ledger
/// directly — results reflect the authoritative state at call time.
pub struct TaskClient {
    ledger: Arc<dyn TaskLedger>,
}

impl TaskClient {
    pub fn new(ledger: Arc<dyn TaskLedger>) -> Self {
        Self { ledger }
    }

    /// Validates, serializes and submits a task.
    ///
    /// Fails with [`TaskError::Conflict`] when the options carry a unique ID
    /// that collides with an outstanding task.
    pub async fn enqueue<T: TaskPayload>(
        &self,
        payload: &T,
        opts: TaskOptions,
    ) -> Result<TaskInfo, TaskError> {
        payload.validate()?;
        let bytes = serde_json::to_vec(payload).map_err(|e| TaskError::Encode {
            kind: T::KIND,
            source: e,
        })?;

        let id = opts.task_id.unwrap_or_else(TaskId::random);
        let info = self
            .ledger
            .enqueue(NewTask {
                id,
                kind: TaskKind::from(T::KIND),
                queue: opts.queue.unwrap_or_else(|| DEFAULT_QUEUE.to_string()),
                payload: bytes,
                max_retry: opts.max_retry,
                timeout: opts.timeout,
                retention: opts.retention,
                schedule_in: opts.schedule_in,
            })
            .await?;

        debug!(task = %info.id, kind = T::KIND, "enqueued");
        Ok(info)
    }

    /// Enqueues a deferred IP deletion with the default budget.
    pub async fn ip_delete(&self, payload: &IpDelete) -> Result<TaskInfo, TaskError> {
        self.enqueue(payload, TaskOptions::default()).await
    }

    /// Enqueues a deferred network deletion with the default budget.
    pub async fn network_delete(&self, payload: &NetworkDelete) -> Result<TaskInfo, TaskError> {
        self.enqueue(payload, TaskOptions::default()).await
    }

    /// Enqueues a deferred machine deletion with the default budget.
    pub async fn machine_delete(&self, payload: &MachineDelete) -> Result<TaskInfo, TaskError> {
        self.enqueue(payload, TaskOptions::default()).await
    }

    /// Enqueues a machine allocation workflow task.
    pub async fn machine_allocation(
        &self,
        payload: &MachineAllocation,
    ) -> Result<TaskInfo, TaskError> {
        self.enqueue(payload, TaskOptions::default()).await
    }

    /// Enqueues a BMC command.
    ///
    /// The task ID is derived from the target machine, so at most one BMC
    /// command per machine can be outstanding: a second enqueue fails with
    /// [`TaskError::Conflict`] instead of queueing a duplicate.
    pub async fn bmc_command(&self, payload: &BmcCommand) -> Result<TaskInfo, TaskError> {
        let opts = TaskOptions::default()
            .with_timeout(BMC_TIMEOUT)
            .with_retention(BMC_RETENTION)
            .with_task_id(TaskId::derived(kind::BMC_COMMAND, &payload.machine_id));
        self.enqueue(payload, opts).await
    }

    /// Names of all queues currently holding task records.
    pub async fn list_queues(&self) -> Result<Vec<String>, TaskError> {
        Ok(self.ledger.queues().await?)
    }

    /// Authoritative snapshot of one task, if it still exists.
    pub async fn get_task_info(&self, id: &TaskId) -> Result<Option<TaskInfo>, TaskError> {
        Ok(self.ledger.get(id).await?)
    }

    /// Lists tasks in a given state, paginated.
    pub async fn list_tasks(
        &self,
        state: TaskState,
        query: &TaskQuery,
    ) -> Result<TaskPage<TaskInfo>, TaskError> {
        Ok(self.ledger.list(state, query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    use ferro_model::BmcOp;
    use ferro_store::MemoryStore;

    fn client() -> TaskClient {
        TaskClient::new(Arc::new(MemoryStore::new()))
    }

    fn bmc(machine_id: &str) -> BmcCommand {
        BmcCommand {
            machine_id: machine_id.to_string(),
            partition: "fra-equ01".to_string(),
            command: BmcOp::PowerCycle,
            issued_at: SystemTime::now(),
            command_id: "c-1".to_string(),
        }
    }

    #[tokio::test]
    async fn ip_delete_gets_default_budget() {
        let client = client();
        let info = client
            .ip_delete(&IpDelete {
                allocation_id: "a-1".to_string(),
                ip: "10.0.0.4".to_string(),
                project: "p-1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(info.kind.as_str(), "ip:delete");
        assert_eq!(info.queue, "default");
        assert_eq!(info.max_retry, 50);
        assert_eq!(info.state, TaskState::Pending);
    }

    #[tokio::test]
    async fn bmc_command_is_unique_per_machine() {
        let client = client();

        let info = client.bmc_command(&bmc("m-42")).await.unwrap();
        assert_eq!(info.id, TaskId::from("machine:bmc-command:m-42"));

        let err = client.bmc_command(&bmc("m-42")).await.unwrap_err();
        assert!(matches!(err, TaskError::Conflict(_)));

        // A different machine is unaffected.
        assert!(client.bmc_command(&bmc("m-43")).await.is_ok());
    }

    #[tokio::test]
    async fn invalid_machine_delete_is_rejected_before_submit() {
        let client = client();

        let err = client
            .machine_delete(&MachineDelete::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::InvalidPayload(_)));

        let page = client
            .list_tasks(TaskState::Pending, &TaskQuery::new())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn inspector_reflects_ledger_state() {
        let client = client();
        let info = client
            .network_delete(&NetworkDelete {
                network_id: "net-1".to_string(),
            })
            .await
            .unwrap();

        let fetched = client.get_task_info(&info.id).await.unwrap().unwrap();
        assert_eq!(fetched.state, TaskState::Pending);

        assert_eq!(client.list_queues().await.unwrap(), vec!["default"]);

        let page = client
            .list_tasks(TaskState::Pending, &TaskQuery::new())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, info.id);
    }
}
