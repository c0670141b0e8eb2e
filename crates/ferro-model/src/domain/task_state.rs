use serde::{Deserialize, Serialize};

/// Lifecycle state of a background task.
///
/// Transitions are driven only by the task server:
///
/// ```text
/// aggregating / scheduled ──► pending ──► active ──► completed
///                                ▲           │
///                                └── retry ◄─┴──► archived
/// ```
///
/// `Completed` and `Archived` are terminal. `Aggregating` and `Scheduled` are
/// pre-pending holding states for batched and deferred work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskState {
    /// Waiting to be grouped with other tasks before becoming pending.
    Aggregating,
    /// Deferred; becomes pending once its process-at time is reached.
    Scheduled,
    /// Ready to be claimed by a worker.
    Pending,
    /// Claimed by a worker; a handler is executing under a lease.
    Active,
    /// Failed and waiting out its backoff delay before re-dispatch.
    Retry,
    /// Handler succeeded; retained for its retention window, then discarded.
    Completed,
    /// Retry budget exhausted or failure was fatal; kept for inspection.
    Archived,
}

impl TaskState {
    /// Returns `true` if the task will not transition further.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Archived)
    }

    /// Short stable label (snake_case) for logs and metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskState::Aggregating => "aggregating",
            TaskState::Scheduled => "scheduled",
            TaskState::Pending => "pending",
            TaskState::Active => "active",
            TaskState::Retry => "retry",
            TaskState::Completed => "completed",
            TaskState::Archived => "archived",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(TaskState::Completed.is_terminal());
        assert!(TaskState::Archived.is_terminal());

        assert!(!TaskState::Aggregating.is_terminal());
        assert!(!TaskState::Scheduled.is_terminal());
        assert!(!TaskState::Pending.is_terminal());
        assert!(!TaskState::Active.is_terminal());
        assert!(!TaskState::Retry.is_terminal());
    }

    #[test]
    fn serde_roundtrip() {
        let state = TaskState::Active;
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#""active""#);

        let back: TaskState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
