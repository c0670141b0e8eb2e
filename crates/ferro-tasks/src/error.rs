use thiserror::Error;

use ferro_model::{PayloadError, TaskId};
use ferro_store::StoreError;

/// Errors returned by the task client and server operations.
///
/// `Conflict` and `InvalidPayload` are contract errors: fatal to the
/// specific call, never retried automatically.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TaskError {
    /// A task with this unique ID is still outstanding.
    #[error("task {0} already outstanding")]
    Conflict(TaskId),

    /// The payload failed validation at enqueue time.
    #[error(transparent)]
    InvalidPayload(#[from] PayloadError),

    /// The payload could not be serialized.
    #[error("encode {kind}: {source}")]
    Encode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The backing store rejected or failed the call.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for TaskError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(id) => TaskError::Conflict(id),
            other => TaskError::Store(other),
        }
    }
}
