//! # ferro-observe
//!
//! Logging bootstrap for Ferro processes: a thin wrapper around
//! `tracing-subscriber` with env-filter levels, text or JSON output with
//! RFC-3339 timestamps, and optional journald delivery on Linux.
//!
//! ```ignore
//! let cfg = LoggerConfig::default();
//! ferro_observe::logger_init(&cfg)?;
//! ```

mod logger;
pub use logger::*;
