use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use tokio::time::{self, Instant};

use ferro_model::{TaskId, TaskInfo, TaskKind, TaskPage, TaskQuery, TaskState};

use crate::{ClaimedTask, NewTask, ReapStats, StoreError, TaskLedger};

use super::MemoryStore;

/// Archived records kept before the reaper trims the oldest.
const MAX_ARCHIVED: usize = 10_000;

const LEASE_EXPIRED: &str = "lease expired";

#[derive(Default)]
pub(crate) struct LedgerState {
    rows: HashMap<String, TaskRow>,
    next_seq: u64,
}

struct TaskRow {
    id: TaskId,
    kind: TaskKind,
    queue: String,
    payload: Vec<u8>,
    state: TaskState,
    retried: u32,
    max_retry: u32,
    timeout: Duration,
    retention: Option<Duration>,
    last_error: Option<String>,
    owner: Option<String>,
    created_at: SystemTime,
    updated_at: SystemTime,
    completed_at: Option<SystemTime>,
    /// When a scheduled/retry row becomes claimable.
    process_at: Instant,
    /// Claim lease; while in the future the row is invisible to claimers.
    lease_deadline: Option<Instant>,
    /// When a retained completed row is discarded.
    purge_at: Option<Instant>,
    /// Enqueue order, used as the FIFO tie-break.
    seq: u64,
}

impl TaskRow {
    fn info(&self) -> TaskInfo {
        TaskInfo {
            id: self.id.clone(),
            kind: self.kind.clone(),
            queue: self.queue.clone(),
            state: self.state,
            retried: self.retried,
            max_retry: self.max_retry,
            last_error: self.last_error.clone(),
            owner: self.owner.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
        }
    }

    fn touch(&mut self) {
        self.updated_at = SystemTime::now();
    }
}

impl LedgerState {
    /// Moves due scheduled/retry rows to pending.
    fn promote_due(&mut self, now: Instant) {
        for row in self.rows.values_mut() {
            if matches!(row.state, TaskState::Scheduled | TaskState::Retry)
                && row.process_at <= now
            {
                row.state = TaskState::Pending;
                row.touch();
            }
        }
    }

    /// Oldest pending row, FIFO by enqueue order.
    fn next_pending(&mut self) -> Option<&mut TaskRow> {
        self.rows
            .values_mut()
            .filter(|r| r.state == TaskState::Pending)
            .min_by_key(|r| r.seq)
    }

    /// Earliest moment a scheduled/retry row becomes due.
    fn next_due(&self, now: Instant) -> Option<Instant> {
        self.rows
            .values()
            .filter(|r| matches!(r.state, TaskState::Scheduled | TaskState::Retry))
            .map(|r| r.process_at.max(now))
            .min()
    }
}

#[async_trait]
impl TaskLedger for MemoryStore {
    async fn enqueue(&self, task: NewTask) -> Result<TaskInfo, StoreError> {
        let mut ledger = self.ledger.lock().await;

        if ledger.rows.contains_key(task.id.as_str()) {
            return Err(StoreError::Conflict(task.id));
        }

        let now = Instant::now();
        let now_sys = SystemTime::now();
        let delay = task.schedule_in.filter(|d| !d.is_zero());
        ledger.next_seq += 1;

        let row = TaskRow {
            id: task.id.clone(),
            kind: task.kind,
            queue: task.queue,
            payload: task.payload,
            state: if delay.is_some() {
                TaskState::Scheduled
            } else {
                TaskState::Pending
            },
            retried: 0,
            max_retry: task.max_retry,
            timeout: task.timeout,
            retention: task.retention,
            last_error: None,
            owner: None,
            created_at: now_sys,
            updated_at: now_sys,
            completed_at: None,
            process_at: now + delay.unwrap_or(Duration::ZERO),
            lease_deadline: None,
            purge_at: None,
            seq: ledger.next_seq,
        };
        let info = row.info();
        ledger.rows.insert(task.id.as_str().to_string(), row);

        self.ledger_notify.notify_one();
        Ok(info)
    }

    async fn claim(
        &self,
        owner: &str,
        lease_grace: Duration,
        wait: Duration,
    ) -> Result<Option<ClaimedTask>, StoreError> {
        let deadline = Instant::now() + wait;

        loop {
            let next_due = {
                let mut ledger = self.ledger.lock().await;
                let now = Instant::now();
                ledger.promote_due(now);

                if let Some(row) = ledger.next_pending() {
                    row.state = TaskState::Active;
                    row.lease_deadline = Some(now + row.timeout + lease_grace);
                    row.owner = Some(owner.to_string());
                    row.touch();
                    return Ok(Some(ClaimedTask {
                        id: row.id.clone(),
                        kind: row.kind.clone(),
                        queue: row.queue.clone(),
                        payload: row.payload.clone(),
                        retried: row.retried,
                        max_retry: row.max_retry,
                        timeout: row.timeout,
                    }));
                }
                ledger.next_due(now)
            };

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            let mut remaining = deadline - now;
            if let Some(due) = next_due {
                // Wake as soon as deferred work becomes due, not only on
                // enqueue notifications.
                remaining = remaining.min(due.saturating_duration_since(now));
            }
            if remaining.is_zero() {
                continue;
            }
            let _ = time::timeout(remaining, self.ledger_notify.notified()).await;
        }
    }

    async fn complete(&self, id: &TaskId) -> Result<(), StoreError> {
        let mut ledger = self.ledger.lock().await;
        let Some(row) = ledger.rows.get_mut(id.as_str()) else {
            return Err(StoreError::NotFound(id.clone()));
        };
        if row.state != TaskState::Active {
            // Lease was reaped; the rerun's outcome wins.
            return Ok(());
        }

        match row.retention {
            Some(retention) => {
                row.state = TaskState::Completed;
                row.completed_at = Some(SystemTime::now());
                row.purge_at = Some(Instant::now() + retention);
                row.lease_deadline = None;
                row.touch();
            }
            None => {
                ledger.rows.remove(id.as_str());
            }
        }
        Ok(())
    }

    async fn retry(&self, id: &TaskId, error: &str, delay: Duration) -> Result<(), StoreError> {
        let mut ledger = self.ledger.lock().await;
        let Some(row) = ledger.rows.get_mut(id.as_str()) else {
            return Err(StoreError::NotFound(id.clone()));
        };
        if row.state != TaskState::Active {
            return Ok(());
        }

        row.state = TaskState::Retry;
        row.retried += 1;
        row.last_error = Some(error.to_string());
        row.process_at = Instant::now() + delay;
        row.lease_deadline = None;
        row.owner = None;
        row.touch();

        self.ledger_notify.notify_one();
        Ok(())
    }

    async fn archive(&self, id: &TaskId, error: &str) -> Result<(), StoreError> {
        let mut ledger = self.ledger.lock().await;
        let Some(row) = ledger.rows.get_mut(id.as_str()) else {
            return Err(StoreError::NotFound(id.clone()));
        };

        row.state = TaskState::Archived;
        row.last_error = Some(error.to_string());
        row.lease_deadline = None;
        row.owner = None;
        row.touch();
        Ok(())
    }

    async fn get(&self, id: &TaskId) -> Result<Option<TaskInfo>, StoreError> {
        let ledger = self.ledger.lock().await;
        Ok(ledger.rows.get(id.as_str()).map(TaskRow::info))
    }

    async fn list(
        &self,
        state: TaskState,
        query: &TaskQuery,
    ) -> Result<TaskPage<TaskInfo>, StoreError> {
        let ledger = self.ledger.lock().await;

        let mut rows: Vec<&TaskRow> = ledger
            .rows
            .values()
            .filter(|r| r.state == state)
            .filter(|r| query.queue.as_deref().is_none_or(|q| r.queue == q))
            .collect();
        rows.sort_by_key(|r| r.seq);

        let total = rows.len();
        let items = rows
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .map(TaskRow::info)
            .collect();

        Ok(TaskPage { items, total })
    }

    async fn queues(&self) -> Result<Vec<String>, StoreError> {
        let ledger = self.ledger.lock().await;
        let mut queues: Vec<String> = ledger.rows.values().map(|r| r.queue.clone()).collect();
        queues.sort_unstable();
        queues.dedup();
        Ok(queues)
    }

    async fn reap(&self) -> Result<ReapStats, StoreError> {
        let mut ledger = self.ledger.lock().await;
        let now = Instant::now();
        let mut stats = ReapStats::default();

        for row in ledger.rows.values_mut() {
            if row.state == TaskState::Active
                && row.lease_deadline.is_some_and(|d| d <= now)
            {
                if row.retried >= row.max_retry {
                    row.state = TaskState::Archived;
                } else {
                    row.state = TaskState::Pending;
                    row.retried += 1;
                }
                row.last_error = Some(LEASE_EXPIRED.to_string());
                row.lease_deadline = None;
                row.owner = None;
                row.touch();
                stats.recovered += 1;
            }
        }

        let purge: Vec<String> = ledger
            .rows
            .iter()
            .filter(|(_, r)| {
                r.state == TaskState::Completed && r.purge_at.is_some_and(|p| p <= now)
            })
            .map(|(k, _)| k.clone())
            .collect();
        for key in purge {
            ledger.rows.remove(&key);
            stats.purged += 1;
        }

        let mut archived: Vec<(u64, String)> = ledger
            .rows
            .iter()
            .filter(|(_, r)| r.state == TaskState::Archived)
            .map(|(k, r)| (r.seq, k.clone()))
            .collect();
        if archived.len() > MAX_ARCHIVED {
            archived.sort_unstable();
            let overflow = archived.len() - MAX_ARCHIVED;
            for (_, key) in archived.into_iter().take(overflow) {
                ledger.rows.remove(&key);
                stats.purged += 1;
            }
        }

        if stats.recovered > 0 {
            self.ledger_notify.notify_one();
        }
        if stats.recovered > 0 || stats.purged > 0 {
            tracing::debug!(
                recovered = stats.recovered,
                purged = stats.purged,
                "ledger reap pass"
            );
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferro_model::kind;

    fn new_task(id: &str) -> NewTask {
        NewTask {
            id: TaskId::from(id),
            kind: TaskKind::from(kind::IP_DELETE),
            queue: "default".to_string(),
            payload: b"{}".to_vec(),
            max_retry: 3,
            timeout: Duration::from_secs(60),
            retention: None,
            schedule_in: None,
        }
    }

    const LEASE: Duration = Duration::from_secs(60);
    const WAIT: Duration = Duration::from_millis(20);

    #[tokio::test]
    async fn claim_then_complete_discards_without_retention() {
        let store = MemoryStore::new();
        store.enqueue(new_task("t-1")).await.unwrap();

        let claimed = store.claim("w-1", LEASE, WAIT).await.unwrap().unwrap();
        assert_eq!(claimed.id, TaskId::from("t-1"));
        assert_eq!(claimed.retried, 0);

        store.complete(&claimed.id).await.unwrap();
        assert!(store.get(&claimed.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn completed_with_retention_is_kept_then_purged() {
        let store = MemoryStore::new();
        let mut task = new_task("t-1");
        task.retention = Some(Duration::from_millis(20));
        store.enqueue(task).await.unwrap();

        let claimed = store.claim("w-1", LEASE, WAIT).await.unwrap().unwrap();
        store.complete(&claimed.id).await.unwrap();

        let info = store.get(&claimed.id).await.unwrap().unwrap();
        assert_eq!(info.state, TaskState::Completed);
        assert!(info.completed_at.is_some());

        tokio::time::sleep(Duration::from_millis(30)).await;
        let stats = store.reap().await.unwrap();
        assert_eq!(stats.purged, 1);
        assert!(store.get(&claimed.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_id_conflicts_while_outstanding() {
        let store = MemoryStore::new();
        store.enqueue(new_task("t-1")).await.unwrap();

        let err = store.enqueue(new_task("t-1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn retry_increments_counter_and_redelivers() {
        let store = MemoryStore::new();
        store.enqueue(new_task("t-1")).await.unwrap();

        let claimed = store.claim("w-1", LEASE, WAIT).await.unwrap().unwrap();
        store
            .retry(&claimed.id, "boom", Duration::ZERO)
            .await
            .unwrap();

        let again = store.claim("w-1", LEASE, WAIT).await.unwrap().unwrap();
        assert_eq!(again.retried, 1);

        let info = store.get(&again.id).await.unwrap().unwrap();
        assert_eq!(info.state, TaskState::Active);
        assert_eq!(info.owner.as_deref(), Some("w-1"));
        assert_eq!(info.last_error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn scheduled_task_becomes_due() {
        let store = MemoryStore::new();
        let mut task = new_task("t-1");
        task.schedule_in = Some(Duration::from_millis(30));
        let info = store.enqueue(task).await.unwrap();
        assert_eq!(info.state, TaskState::Scheduled);

        // Not claimable before its process-at time.
        assert!(
            store
                .claim("w-1", LEASE, Duration::from_millis(5))
                .await
                .unwrap()
                .is_none()
        );

        let claimed = store
            .claim("w-1", LEASE, Duration::from_millis(200))
            .await
            .unwrap();
        assert!(claimed.is_some());
    }

    #[tokio::test]
    async fn expired_lease_is_recovered() {
        let store = MemoryStore::new();
        let mut task = new_task("t-1");
        task.timeout = Duration::from_millis(5);
        store.enqueue(task).await.unwrap();

        let claimed = store
            .claim("w-1", Duration::ZERO, WAIT)
            .await
            .unwrap()
            .unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        let stats = store.reap().await.unwrap();
        assert_eq!(stats.recovered, 1);

        let again = store.claim("w-2", LEASE, WAIT).await.unwrap().unwrap();
        assert_eq!(again.id, claimed.id);
        assert_eq!(again.retried, 1);
    }

    #[tokio::test]
    async fn archive_is_terminal_and_listed() {
        let store = MemoryStore::new();
        store.enqueue(new_task("t-1")).await.unwrap();

        let claimed = store.claim("w-1", LEASE, WAIT).await.unwrap().unwrap();
        store.archive(&claimed.id, "gave up").await.unwrap();

        let info = store.get(&claimed.id).await.unwrap().unwrap();
        assert_eq!(info.state, TaskState::Archived);
        assert_eq!(info.last_error.as_deref(), Some("gave up"));

        let page = store
            .list(TaskState::Archived, &TaskQuery::new())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, claimed.id);
    }

    #[tokio::test]
    async fn list_paginates_in_enqueue_order() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.enqueue(new_task(&format!("t-{i}"))).await.unwrap();
        }

        let page = store
            .list(
                TaskState::Pending,
                &TaskQuery::new().with_limit(2).with_offset(2),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id, TaskId::from("t-2"));
        assert_eq!(page.items[1].id, TaskId::from("t-3"));
    }

    #[tokio::test]
    async fn queues_lists_distinct_names() {
        let store = MemoryStore::new();
        let mut a = new_task("t-1");
        a.queue = "bmc".to_string();
        store.enqueue(a).await.unwrap();
        store.enqueue(new_task("t-2")).await.unwrap();
        store.enqueue(new_task("t-3")).await.unwrap();

        let queues = store.queues().await.unwrap();
        assert_eq!(queues, vec!["bmc".to_string(), "default".to_string()]);
    }
}
