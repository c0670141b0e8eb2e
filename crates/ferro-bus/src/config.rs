use std::time::Duration;

/// Tuning knobs shared by the broadcast and point-to-point primitives.
///
/// ## Field semantics
/// - `max_len`: topic log capacity. Trimming drops the oldest entries first,
///   so a waiter lagging by more than this many elements silently misses the
///   trimmed ones.
/// - `poll_timeout`: upper bound on a single blocking store read. Nothing is
///   lost on expiry (the loop re-reads from its cursor); it only bounds how
///   long a loop can sit inside a store call.
/// - `error_backoff`: fixed sleep after a failed store read before retrying.
/// - `channel_capacity`: output channel buffer; a full buffer backpressures
///   the reader loop, never drops.
#[derive(Clone, Debug)]
pub struct BusConfig {
    /// Maximum entries kept per topic log.
    pub max_len: usize,
    /// Upper bound for one blocking store read.
    pub poll_timeout: Duration,
    /// Sleep between retries after a store error.
    pub error_backoff: Duration,
    /// Capacity of the channel handed to waiters.
    pub channel_capacity: usize,
}

impl Default for BusConfig {
    /// Defaults: log capacity 1000, 5s poll, 1s error backoff, channel of 64.
    fn default() -> Self {
        Self {
            max_len: 1000,
            poll_timeout: Duration::from_secs(5),
            error_backoff: Duration::from_secs(1),
            channel_capacity: 64,
        }
    }
}
