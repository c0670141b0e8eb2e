use thiserror::Error;

use ferro_store::StoreError;

/// Errors surfaced by `notify`/`push` calls.
///
/// Read loops never return these: decode failures are logged and skipped,
/// store failures are retried with backoff until the caller cancels.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BusError {
    /// The element could not be serialized.
    #[error("encode {kind}: {source}")]
    Encode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The store rejected or failed the call.
    #[error(transparent)]
    Store(#[from] StoreError),
}
