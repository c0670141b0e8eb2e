use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use ferro_model::TaskPayload;

use crate::handler::{DynHandler, Handler, TypedHandler};

/// Dispatch table from task kind to handler, built once at startup.
///
/// The server resolves every claimed task through this registry; a kind
/// without a handler is an operational error surfaced at dispatch, never a
/// silent drop.
///
/// # Example
/// ```ignore
/// let mut registry = HandlerRegistry::new();
/// registry.register::<IpDelete, _>(IpDeleteHandler::new(repo))?;
/// let server = TaskServer::new(ledger, Arc::new(registry), ServerConfig::default());
/// ```
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<&'static str, Arc<dyn DynHandler>>,
}

/// Errors raised while building the registry.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two handlers were registered for the same task kind.
    #[error("handler for task kind '{0}' is already registered")]
    AlreadyRegistered(&'static str),
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for payload type `T` under `T::KIND`.
    pub fn register<T: TaskPayload, H: Handler<T> + 'static>(
        &mut self,
        handler: H,
    ) -> Result<(), RegistryError> {
        if self.handlers.contains_key(T::KIND) {
            return Err(RegistryError::AlreadyRegistered(T::KIND));
        }
        self.handlers.insert(T::KIND, Arc::new(TypedHandler::new(handler)));
        Ok(())
    }

    /// Resolves the handler for a task kind.
    pub fn get(&self, kind: &str) -> Option<Arc<dyn DynHandler>> {
        self.handlers.get(kind).cloned()
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<&'static str> = self.handlers.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ferro_model::{IpDelete, NetworkDelete};
    use tokio_util::sync::CancellationToken;

    use crate::HandlerError;

    struct Noop;

    #[async_trait]
    impl Handler<IpDelete> for Noop {
        async fn handle(
            &self,
            _token: CancellationToken,
            _task: IpDelete,
        ) -> Result<(), HandlerError> {
            Ok(())
        }
    }

    #[async_trait]
    impl Handler<NetworkDelete> for Noop {
        async fn handle(
            &self,
            _token: CancellationToken,
            _task: NetworkDelete,
        ) -> Result<(), HandlerError> {
            Ok(())
        }
    }

    #[test]
    fn register_and_resolve() {
        let mut registry = HandlerRegistry::new();
        registry.register::<IpDelete, _>(Noop).unwrap();
        registry.register::<NetworkDelete, _>(Noop).unwrap();

        assert!(registry.get("ip:delete").is_some());
        assert!(registry.get("network:delete").is_some());
        assert!(registry.get("machine:delete").is_none());
        assert_eq!(registry.kinds(), vec!["ip:delete", "network:delete"]);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = HandlerRegistry::new();
        registry.register::<IpDelete, _>(Noop).unwrap();

        let err = registry.register::<IpDelete, _>(Noop).unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered("ip:delete")));
    }
}
