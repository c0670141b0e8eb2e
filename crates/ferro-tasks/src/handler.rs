use async_trait::async_trait;
use std::marker::PhantomData;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use ferro_model::TaskPayload;

/// Errors produced by task handlers.
///
/// `Fail` drives the retry/archive state machine; `Fatal` archives the task
/// immediately. Neither ever crashes the worker pool.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Execution failed but may succeed if retried.
    #[error("execution failed: {0}")]
    Fail(String),

    /// Non-recoverable error; retrying is pointless.
    #[error("fatal error (no retry): {0}")]
    Fatal(String),
}

impl HandlerError {
    pub fn fail(error: impl Into<String>) -> Self {
        HandlerError::Fail(error.into())
    }

    pub fn fatal(error: impl Into<String>) -> Self {
        HandlerError::Fatal(error.into())
    }

    /// Returns `true` if the error type is safe to retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, HandlerError::Fail(_))
    }
}

/// Executes tasks of one payload type.
///
/// The token is a child of the server's runtime token and is cancelled when
/// the task's deadline expires or the server shuts down; long-running
/// handlers should check it at safe points. Handlers must be idempotent:
/// redelivery after a crashed worker or an expired lease re-invokes the same
/// logical operation.
///
/// # Example
/// ```ignore
/// struct IpDeleteHandler { repo: Arc<dyn Repository> }
///
/// #[async_trait]
/// impl Handler<IpDelete> for IpDeleteHandler {
///     async fn handle(&self, _token: CancellationToken, task: IpDelete) -> Result<(), HandlerError> {
///         self.repo.delete_ip(&task.allocation_id, &task.ip, &task.project).await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Handler<T: TaskPayload>: Send + Sync {
    async fn handle(&self, token: CancellationToken, task: T) -> Result<(), HandlerError>;
}

/// Object-safe form of [`Handler`], keyed by the payload's kind string.
///
/// The server stores these in the registry and dispatches on raw payload
/// bytes; [`TypedHandler`] bridges the typed world into this one.
#[async_trait]
pub trait DynHandler: Send + Sync {
    async fn handle_raw(
        &self,
        token: CancellationToken,
        payload: &[u8],
    ) -> Result<(), HandlerError>;

    fn kind(&self) -> &'static str;
}

/// Type-erasure adapter from `Handler<T>` to [`DynHandler`].
pub(crate) struct TypedHandler<T: TaskPayload, H: Handler<T>> {
    handler: H,
    _marker: PhantomData<T>,
}

impl<T: TaskPayload, H: Handler<T>> TypedHandler<T, H> {
    pub(crate) fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T: TaskPayload, H: Handler<T>> DynHandler for TypedHandler<T, H> {
    async fn handle_raw(
        &self,
        token: CancellationToken,
        payload: &[u8],
    ) -> Result<(), HandlerError> {
        // A payload that does not decode will not decode on the next
        // delivery either.
        let task: T = serde_json::from_slice(payload)
            .map_err(|e| HandlerError::Fatal(format!("decode {}: {e}", T::KIND)))?;
        self.handler.handle(token, task).await
    }

    fn kind(&self) -> &'static str {
        T::KIND
    }
}
