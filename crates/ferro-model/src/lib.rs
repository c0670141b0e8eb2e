//! # ferro-model
//!
//! Shared domain model for the Ferro control plane's coordination layer:
//! notification elements and topic naming, background-task payloads, and the
//! task lifecycle types (options, state, info, queries) exchanged between the
//! task client, the task server, and the backing store.

mod domain;
pub use domain::{
    Element, PayloadError, TaskId, TaskInfo, TaskKind, TaskOptions, TaskPage, TaskPayload,
    TaskQuery, TaskState, Topic, kind,
};

mod payload;
pub use payload::{
    BmcCommand, BmcCommandDone, BmcOp, IpDelete, MachineAllocation, MachineDelete, NetworkDelete,
};
