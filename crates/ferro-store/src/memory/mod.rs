//! In-memory store implementation.
//!
//! Backs tests and single-node deployments. State lives under
//! [`tokio::sync::Mutex`]es and blocking reads are built from
//! [`tokio::sync::Notify`] with bounded waits, so every "block until data"
//! call honors its caller's timeout.

mod ledger;
mod log;
mod queue;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, Notify};

use self::ledger::LedgerState;
use self::log::StreamState;
use self::queue::QueueState;

/// In-memory implementation of [`EventLog`](crate::EventLog),
/// [`WorkQueue`](crate::WorkQueue) and [`TaskLedger`](crate::TaskLedger).
///
/// Cheap to clone-share via `Arc`; all synchronization is internal.
#[derive(Default)]
pub struct MemoryStore {
    pub(crate) streams: Mutex<HashMap<String, StreamState>>,
    pub(crate) queues: Mutex<HashMap<String, QueueState>>,
    pub(crate) ledger: Mutex<LedgerState>,
    pub(crate) ledger_notify: Arc<Notify>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}
