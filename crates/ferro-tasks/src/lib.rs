//! # ferro-tasks
//!
//! Durable, retryable background work for the control plane.
//!
//! ## Architecture
//! ```text
//!  TaskClient ──enqueue──► TaskLedger (backing store) ◄──claim── TaskServer
//!     │                        ▲                                    │
//!     │  factory ops           │ complete / retry / archive         │
//!     │  (ip_delete,           │                                    ▼
//!     │   bmc_command, …)      └──────────────── HandlerRegistry ► Handler
//!     │                                                             │
//!     └─ inspector ops (list_queues, get_task_info, list_tasks)     ▼
//!                                                              Repository
//! ```
//!
//! The client serializes a typed payload and submits it with per-type
//! options; the server runs a bounded worker pool that claims ready tasks
//! under a lease and dispatches each by its kind string to a registered
//! handler. Handler outcomes drive the task state machine: success →
//! `completed`, failure → `retry` with backoff while under budget, else
//! `archived`. Redelivery is at-least-once, so handlers must be idempotent.
//!
//! Multiple servers may run against the same store; the ledger's lease
//! semantics keep each task instance on at most one worker at a time.

mod error;
pub use error::TaskError;

mod handler;
pub use handler::{DynHandler, Handler, HandlerError};

mod registry;
pub use registry::{HandlerRegistry, RegistryError};

mod policy;
pub use policy::{Jitter, RetryBackoff};

mod config;
pub use config::ServerConfig;

mod client;
pub use client::TaskClient;

mod server;
pub use server::TaskServer;

pub mod handlers;
