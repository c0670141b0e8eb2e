//! # ferro-store
//!
//! Ports onto the shared backing store, plus the in-memory implementation
//! used by tests and single-node deployments.
//!
//! The store is the single source of truth for the coordination layer; no
//! component caches decoded state across calls. Three primitives are exposed:
//!
//! - [`EventLog`] — append-only, per-topic log with bounded length and a
//!   blocking "read from now on" cursor (broadcast fan-out).
//! - [`WorkQueue`] — blocking list used as a point-to-point queue (each value
//!   delivered to exactly one waiter).
//! - [`TaskLedger`] — durable, scheduled task ledger with lease-based claims,
//!   retry counters and retention.
//!
//! A production deployment implements these against a network store; the
//! lease semantics of [`TaskLedger::claim`] are what make it safe to run
//! multiple task servers against one store.

mod error;
pub use error::StoreError;

mod log;
pub use log::{Cursor, EventLog, LogEntry};

mod queue;
pub use queue::WorkQueue;

mod ledger;
pub use ledger::{ClaimedTask, NewTask, ReapStats, TaskLedger};

mod memory;
pub use memory::MemoryStore;
