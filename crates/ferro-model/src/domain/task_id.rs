use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique task identifier.
///
/// Independent operations (deferred deletes) use [`TaskId::random`], which is
/// time-ordered so concurrent enqueues sort by creation. Operations that must
/// be deduplicated per target (BMC commands) use [`TaskId::derived`], which is
/// deterministic: enqueueing the same `(kind, target)` twice while the first
/// task is outstanding fails with a conflict instead of creating a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Random, time-ordered identifier (UUID v7).
    pub fn random() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Deterministic identifier derived from the task kind and its target.
    pub fn derived(kind: &str, target: &str) -> Self {
        Self(format!("{kind}:{target}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind;

    #[test]
    fn derived_ids_are_deterministic() {
        let a = TaskId::derived(kind::BMC_COMMAND, "m-42");
        let b = TaskId::derived(kind::BMC_COMMAND, "m-42");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "machine:bmc-command:m-42");
    }

    #[test]
    fn random_ids_are_unique() {
        assert_ne!(TaskId::random(), TaskId::random());
    }
}
