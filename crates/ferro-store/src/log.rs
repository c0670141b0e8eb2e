use async_trait::async_trait;
use std::time::Duration;

use crate::StoreError;

/// Position in a topic's log.
///
/// `Cursor::default()` points before the first entry; each appended entry
/// gets a strictly increasing cursor, so entries trimmed from the head never
/// make a later cursor ambiguous.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor(pub u64);

/// One record of a topic's log.
///
/// The serialized element lives under the single well-known `payload` field;
/// whatever else the store keeps per record is not part of the contract.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub cursor: Cursor,
    pub payload: Vec<u8>,
}

/// Append-only, per-topic log with bounded length.
///
/// The log is ordered: a single reader observes entries in publication order.
/// Trimming drops the oldest entries first, so a reader that falls behind by
/// more than the log's maximum length silently misses the trimmed entries —
/// an accepted failure mode of the broadcast primitive.
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Appends a record and trims the log to `max_len` entries.
    async fn append(
        &self,
        topic: &str,
        payload: Vec<u8>,
        max_len: usize,
    ) -> Result<Cursor, StoreError>;

    /// Returns the cursor of the most recent entry ("now"); reading after it
    /// yields only entries published from this point on.
    async fn tail(&self, topic: &str) -> Result<Cursor, StoreError>;

    /// Returns the first entry strictly after `after`, blocking up to `wait`
    /// for one to be appended. `None` means the wait elapsed.
    async fn read_after(
        &self,
        topic: &str,
        after: Cursor,
        wait: Duration,
    ) -> Result<Option<LogEntry>, StoreError>;
}
