use thiserror::Error;

use ferro_model::TaskId;

/// Errors raised by the backing store.
///
/// `Conflict` and `NotFound` are contract errors and are returned to the
/// caller as-is; `Unavailable` is a transport error that read loops retry
/// with backoff.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The task ID collides with an outstanding task.
    #[error("task {0} already outstanding")]
    Conflict(TaskId),

    /// No task with this ID exists.
    #[error("task {0} not found")]
    NotFound(TaskId),

    /// The store could not be reached or answered with a transport failure.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns `true` if retrying the call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}
