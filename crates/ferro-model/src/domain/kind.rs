//! Stable task type identifiers.
//!
//! These strings form the public dispatch contract between the task client
//! and the task server. Adding a background job type means adding an
//! identifier here plus a registered handler; removing one is a breaking
//! change for any in-flight or scheduled task of that type.

/// Deferred deletion of an IP allocation.
pub const IP_DELETE: &str = "ip:delete";

/// Deferred deletion of a network.
pub const NETWORK_DELETE: &str = "network:delete";

/// Deferred deletion of a machine and/or its allocation.
pub const MACHINE_DELETE: &str = "machine:delete";

/// Out-of-band management command against a machine's BMC.
pub const BMC_COMMAND: &str = "machine:bmc-command";

/// Machine allocation workflow.
pub const MACHINE_ALLOCATION: &str = "machine:allocation";
