//! # ferro-bus
//!
//! The two in-fleet delivery primitives of the coordination layer, built on
//! the [`ferro_store`] ports:
//!
//! - [`Notifier`] — broadcast. Every independent waiter receives its own
//!   full copy of every element published after it started watching.
//!   Used to tell the whole fleet "machine X is ready" without knowing who
//!   listens.
//! - [`Queue`] — point-to-point. Each pushed value is received by exactly
//!   one of possibly several competing waiters. Used to route a single
//!   result to the one process that asked for it, keyed by an ad-hoc name
//!   (typically the machine ID).
//!
//! Both `wait` operations return an [`tokio::sync::mpsc`] receiver fed by a
//! spawned reader loop. The loops observe a caller-supplied
//! [`CancellationToken`](tokio_util::sync::CancellationToken) and close the
//! channel promptly once it fires; store reads use a short per-iteration
//! timeout so nothing blocks unboundedly.

mod config;
pub use config::BusConfig;

mod error;
pub use error::BusError;

mod notify;
pub use notify::Notifier;

mod queue;
pub use queue::Queue;
