use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use ferro_store::{ClaimedTask, TaskLedger};

use crate::{DynHandler as _, HandlerError, HandlerRegistry, RetryBackoff, ServerConfig};

/// Sleep after a failed claim call before the pull loop retries.
const CLAIM_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Consumer side of the durable task system: a bounded worker pool fed by
/// the ledger.
///
/// The pull loop claims one ready task at a time (each claim takes a lease
/// sized to the task's timeout) and hands it to a worker; at most
/// `concurrency` handlers run at once. Handler outcomes drive the state
/// machine:
///
/// - success → `completed` (retained per the task's options, else dropped);
/// - retryable failure or deadline hit → `retry` with a backoff delay while
///   under the retry budget, else `archived`;
/// - fatal failure or missing handler → `archived`, with the error surfaced
///   in the task's `last_error` and in the log.
///
/// A reaper interval recovers tasks whose lease expired (crashed worker)
/// and purges records past their retention.
///
/// # Example
/// ```ignore
/// let server = TaskServer::new(ledger, Arc::new(registry), ServerConfig::default());
/// let token = CancellationToken::new();
/// tokio::spawn(async move { server.run(token).await });
/// ```
pub struct TaskServer {
    ledger: Arc<dyn TaskLedger>,
    registry: Arc<HandlerRegistry>,
    config: ServerConfig,
}

impl TaskServer {
    pub fn new(
        ledger: Arc<dyn TaskLedger>,
        registry: Arc<HandlerRegistry>,
        config: ServerConfig,
    ) -> Self {
        Self {
            ledger,
            registry,
            config,
        }
    }

    /// Runs the pull loop until `token` fires, then waits up to the shutdown
    /// grace for in-flight handlers to finish.
    pub async fn run(&self, token: CancellationToken) {
        let concurrency = self.config.concurrency.max(1);
        let semaphore = Arc::new(Semaphore::new(concurrency));

        info!(
            identity = %self.config.identity,
            concurrency,
            kinds = ?self.registry.kinds(),
            "task server started"
        );

        let reaper = tokio::spawn(reap_loop(
            self.ledger.clone(),
            self.config.reap_interval,
            token.clone(),
        ));

        loop {
            if token.is_cancelled() {
                break;
            }

            let permit = tokio::select! {
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_closed) => break,
                },
                _ = token.cancelled() => break,
            };

            let claimed = tokio::select! {
                claimed = self.ledger.claim(
                    &self.config.identity,
                    self.config.lease_grace,
                    self.config.poll_timeout,
                ) => claimed,
                _ = token.cancelled() => break,
            };

            match claimed {
                Ok(Some(task)) => {
                    let ledger = self.ledger.clone();
                    let registry = self.registry.clone();
                    let backoff = self.config.backoff;
                    let child = token.child_token();
                    tokio::spawn(async move {
                        let _permit = permit;
                        run_task(ledger, registry, backoff, task, child).await;
                    });
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(%err, "claim failed");
                    tokio::select! {
                        _ = time::sleep(CLAIM_ERROR_BACKOFF) => {}
                        _ = token.cancelled() => break,
                    }
                }
            }
        }

        // Drain: every worker holds a permit until its outcome is recorded.
        let drained = time::timeout(
            self.config.shutdown_grace,
            semaphore.acquire_many(concurrency as u32),
        )
        .await;
        match drained {
            Ok(_) => info!("task server stopped"),
            Err(_) => warn!(
                grace = ?self.config.shutdown_grace,
                "shutdown grace exceeded with handlers still in flight"
            ),
        }
        let _ = reaper.await;
    }
}

/// Executes one claimed task and records exactly one outcome.
async fn run_task(
    ledger: Arc<dyn TaskLedger>,
    registry: Arc<HandlerRegistry>,
    backoff: RetryBackoff,
    task: ClaimedTask,
    token: CancellationToken,
) {
    let Some(handler) = registry.get(task.kind.as_str()) else {
        error!(task = %task.id, kind = %task.kind, "no handler registered");
        record(
            ledger
                .archive(
                    &task.id,
                    &format!("no handler registered for {}", task.kind),
                )
                .await,
            &task,
        );
        return;
    };

    debug!(
        task = %task.id,
        kind = %task.kind,
        attempt = task.retried + 1,
        "dispatching"
    );

    let child = token.child_token();
    let outcome = match time::timeout(task.timeout, handler.handle_raw(child.clone(), &task.payload))
        .await
    {
        Ok(outcome) => outcome,
        Err(_elapsed) => {
            child.cancel();
            Err(HandlerError::Fail(format!(
                "timed out after {:?}",
                task.timeout
            )))
        }
    };

    match outcome {
        Ok(()) => {
            debug!(task = %task.id, kind = %task.kind, "completed");
            record(ledger.complete(&task.id).await, &task);
        }
        Err(HandlerError::Fatal(msg)) => {
            error!(task = %task.id, kind = %task.kind, error = %msg, "fatal failure, archiving");
            record(ledger.archive(&task.id, &msg).await, &task);
        }
        Err(err) => {
            let msg = err.to_string();
            if task.retried < task.max_retry {
                let delay = backoff.next(task.retried);
                warn!(
                    task = %task.id,
                    kind = %task.kind,
                    error = %msg,
                    retried = task.retried,
                    delay_ms = delay.as_millis() as u64,
                    "task failed, retrying"
                );
                record(ledger.retry(&task.id, &msg, delay).await, &task);
            } else {
                error!(
                    task = %task.id,
                    kind = %task.kind,
                    error = %msg,
                    max_retry = task.max_retry,
                    "retry budget exhausted, archiving"
                );
                record(ledger.archive(&task.id, &msg).await, &task);
            }
        }
    }
}

fn record(result: Result<(), ferro_store::StoreError>, task: &ClaimedTask) {
    if let Err(err) = result {
        // The lease will expire and the reaper redelivers; handlers are
        // idempotent, so losing the outcome costs one extra run.
        warn!(task = %task.id, %err, "failed to record task outcome");
    }
}

/// Recovers expired leases and purges retained records on a fixed cadence.
async fn reap_loop(ledger: Arc<dyn TaskLedger>, interval: Duration, token: CancellationToken) {
    let mut ticker = time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(err) = ledger.reap().await {
                    warn!(%err, "reap pass failed");
                }
            }
            _ = token.cancelled() => break,
        }
    }
}
