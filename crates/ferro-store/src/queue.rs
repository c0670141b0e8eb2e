use async_trait::async_trait;
use std::time::Duration;

use crate::StoreError;

/// Blocking list used as a point-to-point queue.
///
/// Each pushed value is handed to exactly one popper. When several callers
/// block on the same queue name, the wake order is the store's own and must
/// not be assumed FIFO-fair across callers; FIFO holds only from the
/// producer's perspective into the queue as a whole.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Appends a value to the named queue.
    async fn push(&self, queue: &str, payload: Vec<u8>) -> Result<(), StoreError>;

    /// Pops one value, blocking up to `wait` for one to arrive. `None` means
    /// the wait elapsed.
    async fn pop(&self, queue: &str, wait: Duration) -> Result<Option<Vec<u8>>, StoreError>;
}
