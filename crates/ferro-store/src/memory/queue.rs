use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{self, Instant};

use crate::{StoreError, WorkQueue};

use super::MemoryStore;

#[derive(Default)]
pub(crate) struct QueueState {
    items: VecDeque<Vec<u8>>,
    notify: Arc<Notify>,
}

impl MemoryStore {
    /// Pops under the lock; on success wakes one more waiter if items remain,
    /// since each push hands out a single wake permit.
    async fn try_pop(&self, queue: &str) -> Option<Vec<u8>> {
        let mut queues = self.queues.lock().await;
        let qs = queues.get_mut(queue)?;
        let item = qs.items.pop_front()?;
        if !qs.items.is_empty() {
            qs.notify.notify_one();
        }
        Some(item)
    }

    async fn queue_notify(&self, queue: &str) -> Arc<Notify> {
        let mut queues = self.queues.lock().await;
        queues.entry(queue.to_string()).or_default().notify.clone()
    }
}

#[async_trait]
impl WorkQueue for MemoryStore {
    async fn push(&self, queue: &str, payload: Vec<u8>) -> Result<(), StoreError> {
        let mut queues = self.queues.lock().await;
        let qs = queues.entry(queue.to_string()).or_default();
        qs.items.push_back(payload);
        // notify_one stores a permit when nobody is waiting yet, so a pop
        // that registers later still wins the race. Which of several blocked
        // callers wakes is unspecified.
        qs.notify.notify_one();
        Ok(())
    }

    async fn pop(&self, queue: &str, wait: Duration) -> Result<Option<Vec<u8>>, StoreError> {
        let deadline = Instant::now() + wait;

        loop {
            if let Some(item) = self.try_pop(queue).await {
                return Ok(Some(item));
            }

            let notify = self.queue_notify(queue).await;
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            // A consumed permit with an empty queue just means another popper
            // was faster; loop and wait again for the remaining time.
            let _ = time::timeout(remaining, notify.notified()).await;
            if Instant::now() >= deadline {
                return Ok(self.try_pop(queue).await);
            }
        }
    }
}
