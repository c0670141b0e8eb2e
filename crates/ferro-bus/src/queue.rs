use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use ferro_model::Element;
use ferro_store::WorkQueue;

use crate::{BusConfig, BusError};

/// Point-to-point queue: the opposite sharing policy from the broadcast
/// notifier.
///
/// Each pushed value is consumed by exactly one of possibly several blocked
/// waiters, chosen by the store's wake order — not FIFO-fair across waiters,
/// FIFO only from the producer's perspective. Queue names are ad-hoc
/// caller-chosen strings, in practice the target machine's ID, so a single
/// result (an allocation decision, a BMC command) reaches exactly the one
/// process responsible for that machine.
pub struct Queue {
    store: Arc<dyn WorkQueue>,
    config: BusConfig,
}

impl Queue {
    pub fn new(store: Arc<dyn WorkQueue>, config: BusConfig) -> Self {
        Self { store, config }
    }

    /// Appends a value to the named queue.
    pub async fn push<T: Element>(&self, queue: &str, value: &T) -> Result<(), BusError> {
        let payload = serde_json::to_vec(value).map_err(|e| BusError::Encode {
            kind: T::KIND,
            source: e,
        })?;
        self.store.push(queue, payload).await?;
        debug!(queue, kind = T::KIND, "pushed");
        Ok(())
    }

    /// Starts a competing waiter on the named queue.
    ///
    /// The reader loop pops one value at a time until `token` fires or the
    /// receiver is dropped; decode failures are logged and skipped without
    /// consuming a delivery for anyone else.
    pub fn wait<T: Element>(&self, queue: &str, token: CancellationToken) -> mpsc::Receiver<T> {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        let store = self.store.clone();
        let queue = queue.to_string();
        let poll = self.config.poll_timeout;
        let backoff = self.config.error_backoff;
        tokio::spawn(pop_loop(store, queue, poll, backoff, tx, token));
        rx
    }
}

async fn pop_loop<T: Element>(
    store: Arc<dyn WorkQueue>,
    queue: String,
    poll: Duration,
    backoff: Duration,
    tx: mpsc::Sender<T>,
    token: CancellationToken,
) {
    loop {
        let popped = tokio::select! {
            _ = token.cancelled() => break,
            popped = store.pop(&queue, poll) => popped,
        };

        match popped {
            Ok(Some(payload)) => match serde_json::from_slice::<T>(&payload) {
                Ok(value) => {
                    let delivered = tokio::select! {
                        _ = token.cancelled() => false,
                        sent = tx.send(value) => sent.is_ok(),
                    };
                    if !delivered {
                        break;
                    }
                }
                Err(err) => warn!(queue, %err, "skipping undecodable value"),
            },
            Ok(None) => {}
            Err(err) => {
                warn!(queue, %err, "queue pop failed");
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = time::sleep(backoff) => {}
                }
            }
        }
    }
    debug!(queue, "queue waiter stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferro_store::MemoryStore;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct AllocationResult {
        allocation_id: String,
    }

    impl Element for AllocationResult {
        const KIND: &'static str = "allocation-result";
    }

    fn test_config() -> BusConfig {
        BusConfig {
            max_len: 1000,
            poll_timeout: Duration::from_millis(25),
            error_backoff: Duration::from_millis(25),
            channel_capacity: 64,
        }
    }

    #[tokio::test]
    async fn each_value_reaches_exactly_one_waiter() {
        let queue = Queue::new(Arc::new(MemoryStore::new()), test_config());
        let token = CancellationToken::new();

        const PUSHES: usize = 100;
        const WAITERS: usize = 10;

        let mut receivers: Vec<_> = (0..WAITERS)
            .map(|_| queue.wait::<AllocationResult>("m-42", token.clone()))
            .collect();

        for i in 0..PUSHES {
            queue
                .push(
                    "m-42",
                    &AllocationResult {
                        allocation_id: format!("a-{i}"),
                    },
                )
                .await
                .unwrap();
        }

        let mut got = Vec::new();
        while got.len() < PUSHES {
            for rx in receivers.iter_mut() {
                if let Ok(Some(value)) =
                    time::timeout(Duration::from_millis(100), rx.recv()).await
                {
                    got.push(value.allocation_id);
                }
            }
        }

        // No duplication, no loss; distribution across waiters unspecified.
        got.sort_unstable();
        let mut want: Vec<String> = (0..PUSHES).map(|i| format!("a-{i}")).collect();
        want.sort_unstable();
        assert_eq!(got, want);
        token.cancel();
    }

    #[tokio::test]
    async fn cancellation_closes_the_channel() {
        let queue = Queue::new(Arc::new(MemoryStore::new()), test_config());
        let token = CancellationToken::new();

        let mut rx = queue.wait::<AllocationResult>("m-42", token.clone());
        token.cancel();

        let closed = time::timeout(Duration::from_millis(100), rx.recv()).await;
        assert_eq!(closed.expect("closes within one backoff interval"), None);
    }

    #[tokio::test]
    async fn undecodable_values_are_skipped() {
        let store = Arc::new(MemoryStore::new());
        let queue = Queue::new(store.clone(), test_config());
        let token = CancellationToken::new();

        let mut rx = queue.wait::<AllocationResult>("m-42", token.clone());

        ferro_store::WorkQueue::push(&*store, "m-42", b"not json".to_vec())
            .await
            .unwrap();
        queue
            .push(
                "m-42",
                &AllocationResult {
                    allocation_id: "a-1".to_string(),
                },
            )
            .await
            .unwrap();

        let value = rx.recv().await.expect("value delivered");
        assert_eq!(value.allocation_id, "a-1");
        token.cancel();
    }

    #[tokio::test]
    async fn queue_names_are_isolated() {
        let queue = Queue::new(Arc::new(MemoryStore::new()), test_config());
        let token = CancellationToken::new();

        let mut other = queue.wait::<AllocationResult>("m-2", token.clone());
        queue
            .push(
                "m-1",
                &AllocationResult {
                    allocation_id: "a-1".to_string(),
                },
            )
            .await
            .unwrap();

        let nothing = time::timeout(Duration::from_millis(60), other.recv()).await;
        assert!(nothing.is_err(), "value crossed queue names");
        token.cancel();
    }
}
