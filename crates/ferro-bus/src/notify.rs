use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use ferro_model::{Element, Topic};
use ferro_store::{Cursor, EventLog};

use crate::{BusConfig, BusError};

/// Broadcast publisher and waiter factory for one topic prefix.
///
/// Publishing appends to a bounded per-type log; every waiter reads with its
/// own cursor, so each receives every element published after its `wait`
/// call (multicast, not work-sharing). Delivery is at-least-once for readers
/// that stay caught up: a waiter lagging by more than the log capacity
/// silently misses the trimmed elements.
///
/// # Example
/// ```ignore
/// let notifier = Notifier::new(store, "fleet", BusConfig::default());
/// let mut ready = notifier.wait::<MachineReady>(token.clone()).await?;
///
/// tokio::spawn(async move {
///     while let Some(ev) = ready.recv().await {
///         // every waiter in the fleet sees this event
///     }
/// });
///
/// notifier.notify(&MachineReady { machine_id }).await?;
/// ```
pub struct Notifier {
    log: Arc<dyn EventLog>,
    prefix: String,
    config: BusConfig,
}

impl Notifier {
    pub fn new(log: Arc<dyn EventLog>, prefix: impl Into<String>, config: BusConfig) -> Self {
        Self {
            log,
            prefix: prefix.into(),
            config,
        }
    }

    /// Topic that elements of type `T` travel on under this prefix.
    pub fn topic_for<T: Element>(&self) -> Topic {
        Topic::of::<T>(&self.prefix)
    }

    /// Publishes an element to every current waiter of its type.
    pub async fn notify<T: Element>(&self, elem: &T) -> Result<(), BusError> {
        let topic = self.topic_for::<T>();
        let payload = serde_json::to_vec(elem).map_err(|e| BusError::Encode {
            kind: T::KIND,
            source: e,
        })?;

        let cursor = self
            .log
            .append(topic.as_str(), payload, self.config.max_len)
            .await?;
        debug!(topic = %topic, cursor = cursor.0, "published");
        Ok(())
    }

    /// Starts an independent waiter for elements of type `T`.
    ///
    /// The cursor is positioned at "now": only elements published after this
    /// call are delivered, there is no backlog replay. The reader loop runs
    /// until `token` fires or the receiver is dropped; either way the
    /// channel ends cleanly.
    pub async fn wait<T: Element>(
        &self,
        token: CancellationToken,
    ) -> Result<mpsc::Receiver<T>, BusError> {
        let topic = self.topic_for::<T>();
        let cursor = self.log.tail(topic.as_str()).await?;

        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        let log = self.log.clone();
        let poll = self.config.poll_timeout;
        let backoff = self.config.error_backoff;
        tokio::spawn(watch_loop(log, topic, cursor, poll, backoff, tx, token));

        Ok(rx)
    }
}

async fn watch_loop<T: Element>(
    log: Arc<dyn EventLog>,
    topic: Topic,
    mut cursor: Cursor,
    poll: Duration,
    backoff: Duration,
    tx: mpsc::Sender<T>,
    token: CancellationToken,
) {
    loop {
        let read = tokio::select! {
            _ = token.cancelled() => break,
            read = log.read_after(topic.as_str(), cursor, poll) => read,
        };

        match read {
            Ok(Some(entry)) => {
                cursor = entry.cursor;
                match serde_json::from_slice::<T>(&entry.payload) {
                    Ok(elem) => {
                        let delivered = tokio::select! {
                            _ = token.cancelled() => false,
                            sent = tx.send(elem) => sent.is_ok(),
                        };
                        if !delivered {
                            break;
                        }
                    }
                    // Local recovery: the cursor already advanced, other
                    // waiters are unaffected.
                    Err(err) => warn!(topic = %topic, %err, "skipping undecodable element"),
                }
            }
            Ok(None) => {}
            Err(err) => {
                warn!(topic = %topic, %err, "event log read failed");
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = time::sleep(backoff) => {}
                }
            }
        }
    }
    debug!(topic = %topic, "waiter stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferro_store::MemoryStore;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct MachineReady {
        machine_id: String,
    }

    impl Element for MachineReady {
        const KIND: &'static str = "machine-ready";
    }

    fn test_config() -> BusConfig {
        BusConfig {
            max_len: 2000,
            poll_timeout: Duration::from_millis(25),
            error_backoff: Duration::from_millis(25),
            channel_capacity: 64,
        }
    }

    fn notifier() -> Notifier {
        Notifier::new(Arc::new(MemoryStore::new()), "core", test_config())
    }

    #[tokio::test]
    async fn every_waiter_receives_every_element_in_order() {
        let notifier = notifier();
        let token = CancellationToken::new();

        const COUNT: usize = 1000;
        let mut first = notifier.wait::<MachineReady>(token.clone()).await.unwrap();
        let mut second = notifier.wait::<MachineReady>(token.clone()).await.unwrap();

        for i in 0..COUNT {
            notifier
                .notify(&MachineReady {
                    machine_id: format!("m-{i}"),
                })
                .await
                .unwrap();
        }

        for rx in [&mut first, &mut second] {
            for i in 0..COUNT {
                let elem = rx.recv().await.expect("element delivered");
                assert_eq!(elem.machine_id, format!("m-{i}"));
            }
        }
        token.cancel();
    }

    #[tokio::test]
    async fn no_backlog_replay() {
        let notifier = notifier();
        let token = CancellationToken::new();

        notifier
            .notify(&MachineReady {
                machine_id: "m-before".to_string(),
            })
            .await
            .unwrap();

        let mut rx = notifier.wait::<MachineReady>(token.clone()).await.unwrap();
        notifier
            .notify(&MachineReady {
                machine_id: "m-after".to_string(),
            })
            .await
            .unwrap();

        let elem = rx.recv().await.expect("element delivered");
        assert_eq!(elem.machine_id, "m-after");
        token.cancel();
    }

    #[tokio::test]
    async fn cancellation_closes_the_channel() {
        let notifier = notifier();
        let token = CancellationToken::new();

        let mut rx = notifier.wait::<MachineReady>(token.clone()).await.unwrap();
        token.cancel();

        let closed = time::timeout(Duration::from_millis(100), rx.recv()).await;
        assert_eq!(closed.expect("closes within one backoff interval"), None);
    }

    #[tokio::test]
    async fn undecodable_elements_are_skipped() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Notifier::new(store.clone(), "core", test_config());
        let token = CancellationToken::new();

        let mut rx = notifier.wait::<MachineReady>(token.clone()).await.unwrap();

        let topic = notifier.topic_for::<MachineReady>();
        ferro_store::EventLog::append(&*store, topic.as_str(), b"not json".to_vec(), 100)
            .await
            .unwrap();
        notifier
            .notify(&MachineReady {
                machine_id: "m-1".to_string(),
            })
            .await
            .unwrap();

        let elem = rx.recv().await.expect("element delivered");
        assert_eq!(elem.machine_id, "m-1");
        token.cancel();
    }

    #[tokio::test]
    async fn distinct_types_do_not_cross_deliver() {
        #[derive(Debug, Serialize, Deserialize)]
        struct SwitchReady {
            switch_id: String,
        }
        impl Element for SwitchReady {
            const KIND: &'static str = "switch-ready";
        }

        let notifier = notifier();
        let token = CancellationToken::new();

        let mut machines = notifier.wait::<MachineReady>(token.clone()).await.unwrap();
        notifier
            .notify(&SwitchReady {
                switch_id: "sw-1".to_string(),
            })
            .await
            .unwrap();

        let nothing = time::timeout(Duration::from_millis(60), machines.recv()).await;
        assert!(nothing.is_err(), "element of another type was delivered");
        token.cancel();
    }
}
