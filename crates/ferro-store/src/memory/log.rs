use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{self, Instant};

use crate::{Cursor, EventLog, LogEntry, StoreError};

use super::MemoryStore;

#[derive(Default)]
pub(crate) struct StreamState {
    /// Cursor of the most recently appended entry (0 = empty).
    next: u64,
    entries: VecDeque<(u64, Vec<u8>)>,
    notify: Arc<Notify>,
}

impl StreamState {
    fn entry_after(&self, after: Cursor) -> Option<LogEntry> {
        self.entries
            .iter()
            .find(|(c, _)| *c > after.0)
            .map(|(c, p)| LogEntry {
                cursor: Cursor(*c),
                payload: p.clone(),
            })
    }
}

impl MemoryStore {
    async fn find_entry(&self, topic: &str, after: Cursor) -> Option<LogEntry> {
        let streams = self.streams.lock().await;
        streams.get(topic).and_then(|st| st.entry_after(after))
    }

    async fn stream_notify(&self, topic: &str) -> Arc<Notify> {
        let mut streams = self.streams.lock().await;
        streams.entry(topic.to_string()).or_default().notify.clone()
    }
}

#[async_trait]
impl EventLog for MemoryStore {
    async fn append(
        &self,
        topic: &str,
        payload: Vec<u8>,
        max_len: usize,
    ) -> Result<Cursor, StoreError> {
        let mut streams = self.streams.lock().await;
        let st = streams.entry(topic.to_string()).or_default();

        st.next += 1;
        st.entries.push_back((st.next, payload));
        while st.entries.len() > max_len.max(1) {
            st.entries.pop_front();
        }

        st.notify.notify_waiters();
        Ok(Cursor(st.next))
    }

    async fn tail(&self, topic: &str) -> Result<Cursor, StoreError> {
        let streams = self.streams.lock().await;
        Ok(Cursor(streams.get(topic).map(|st| st.next).unwrap_or(0)))
    }

    async fn read_after(
        &self,
        topic: &str,
        after: Cursor,
        wait: Duration,
    ) -> Result<Option<LogEntry>, StoreError> {
        let deadline = Instant::now() + wait;

        loop {
            if let Some(entry) = self.find_entry(topic, after).await {
                return Ok(Some(entry));
            }

            let notify = self.stream_notify(topic).await;
            let notified = notify.notified();
            tokio::pin!(notified);
            // Register before the re-check: notify_waiters only wakes
            // registered waiters, so an append between the check and the
            // await would otherwise be lost until the next wait expires.
            notified.as_mut().enable();

            if let Some(entry) = self.find_entry(topic, after).await {
                return Ok(Some(entry));
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            if time::timeout(remaining, notified).await.is_err() {
                return Ok(None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_sees_appends_in_order() {
        let store = MemoryStore::new();

        let mut cursor = store.tail("t").await.unwrap();
        for i in 0..5u8 {
            store.append("t", vec![i], 100).await.unwrap();
        }

        for i in 0..5u8 {
            let entry = store
                .read_after("t", cursor, Duration::from_millis(10))
                .await
                .unwrap()
                .expect("entry present");
            assert_eq!(entry.payload, vec![i]);
            cursor = entry.cursor;
        }
    }

    #[tokio::test]
    async fn trim_drops_oldest_first() {
        let store = MemoryStore::new();

        for i in 0..10u8 {
            store.append("t", vec![i], 3).await.unwrap();
        }

        let mut seen = Vec::new();
        let mut cursor = Cursor::default();
        while let Some(entry) = store
            .read_after("t", cursor, Duration::from_millis(5))
            .await
            .unwrap()
        {
            seen.push(entry.payload[0]);
            cursor = entry.cursor;
        }
        assert_eq!(seen, vec![7, 8, 9]);
    }

    #[tokio::test]
    async fn tail_skips_backlog() {
        let store = MemoryStore::new();
        store.append("t", vec![1], 100).await.unwrap();

        let cursor = store.tail("t").await.unwrap();
        store.append("t", vec![2], 100).await.unwrap();

        let entry = store
            .read_after("t", cursor, Duration::from_millis(10))
            .await
            .unwrap()
            .expect("entry present");
        assert_eq!(entry.payload, vec![2]);
    }

    #[tokio::test]
    async fn blocked_read_wakes_on_append() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let cursor = store.tail("t").await.unwrap();

        let reader = {
            let store = store.clone();
            tokio::spawn(async move { store.read_after("t", cursor, Duration::from_secs(5)).await })
        };

        tokio::task::yield_now().await;
        store.append("t", vec![42], 100).await.unwrap();

        let entry = reader.await.unwrap().unwrap().expect("entry present");
        assert_eq!(entry.payload, vec![42]);
    }
}
