use async_trait::async_trait;
use std::time::Duration;

use ferro_model::{TaskId, TaskInfo, TaskKind, TaskPage, TaskQuery, TaskState};

use crate::StoreError;

/// A task as submitted by the client.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub id: TaskId,
    pub kind: TaskKind,
    pub queue: String,
    pub payload: Vec<u8>,
    pub max_retry: u32,
    pub timeout: Duration,
    pub retention: Option<Duration>,
    /// Defer the first dispatch; the task sits in `scheduled` until due.
    pub schedule_in: Option<Duration>,
}

/// A task handed to a worker under a lease.
#[derive(Debug, Clone)]
pub struct ClaimedTask {
    pub id: TaskId,
    pub kind: TaskKind,
    pub queue: String,
    pub payload: Vec<u8>,
    /// Retries performed before this attempt (0 on the first).
    pub retried: u32,
    pub max_retry: u32,
    pub timeout: Duration,
}

/// Result of a reaper pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReapStats {
    /// Tasks whose lease had expired and were made claimable again.
    pub recovered: usize,
    /// Task records removed (retention elapsed or archive trimmed).
    pub purged: usize,
}

/// Durable, scheduled task ledger.
///
/// The ledger owns the task state machine; workers drive it exclusively
/// through [`claim`](TaskLedger::claim) and the three outcome calls. A claim
/// takes a lease: until the lease expires the task is invisible to other
/// claimers, which is what guarantees at-most-one active handler execution
/// per task across horizontally scaled servers. A crashed worker's lease
/// runs out and [`reap`](TaskLedger::reap) makes the task claimable again,
/// so redelivery is at-least-once and handlers must be idempotent.
#[async_trait]
pub trait TaskLedger: Send + Sync {
    /// Submits a task. Fails with [`StoreError::Conflict`] when the ID
    /// collides with a task that is still outstanding (any state, including
    /// completed records held by retention).
    async fn enqueue(&self, task: NewTask) -> Result<TaskInfo, StoreError>;

    /// Claims the next due task for `owner`, blocking up to `wait`. The task
    /// becomes `active` and invisible to other claimers for its own
    /// execution timeout plus `lease_grace`, so a healthy worker always
    /// reports an outcome before the lease runs out.
    async fn claim(
        &self,
        owner: &str,
        lease_grace: Duration,
        wait: Duration,
    ) -> Result<Option<ClaimedTask>, StoreError>;

    /// Marks an active task `completed`. The record is kept for its
    /// retention window if one was configured, otherwise discarded at once.
    /// A no-op if the task is no longer active (its lease was reaped).
    async fn complete(&self, id: &TaskId) -> Result<(), StoreError>;

    /// Marks an active task `retry`; it becomes claimable again once `delay`
    /// has elapsed. Increments the retry counter.
    async fn retry(&self, id: &TaskId, error: &str, delay: Duration) -> Result<(), StoreError>;

    /// Marks a task `archived` with its final error; kept for inspection.
    async fn archive(&self, id: &TaskId, error: &str) -> Result<(), StoreError>;

    /// Authoritative snapshot of one task.
    async fn get(&self, id: &TaskId) -> Result<Option<TaskInfo>, StoreError>;

    /// Lists tasks in the given state, paginated, newest enqueued last.
    async fn list(
        &self,
        state: TaskState,
        query: &TaskQuery,
    ) -> Result<TaskPage<TaskInfo>, StoreError>;

    /// Names of all queues that hold at least one task record.
    async fn queues(&self) -> Result<Vec<String>, StoreError>;

    /// Recovers expired leases and purges records past retention.
    async fn reap(&self) -> Result<ReapStats, StoreError>;
}
