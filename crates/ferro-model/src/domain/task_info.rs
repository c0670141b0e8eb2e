use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use super::{TaskId, TaskKind, TaskState};

/// Snapshot of a task's authoritative state in the backing store.
///
/// Returned by enqueue and by the inspector operations; always reflects the
/// store at call time, never a client-side cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    /// Unique task identifier.
    pub id: TaskId,
    /// Task type the server dispatches on.
    pub kind: TaskKind,
    /// Queue the task is routed to.
    pub queue: String,
    /// Current lifecycle state.
    pub state: TaskState,
    /// Number of retries performed so far (0 on first attempt).
    pub retried: u32,
    /// Maximum number of retries before the task is archived.
    pub max_retry: u32,
    /// Error from the most recent failed attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Identity of the server instance holding the claim lease (set while
    /// the task is active).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// When the task was enqueued.
    #[serde(with = "time_serde")]
    pub created_at: SystemTime,
    /// When the task last changed state.
    #[serde(with = "time_serde")]
    pub updated_at: SystemTime,
    /// When the task completed (if it has).
    #[serde(default, skip_serializing_if = "Option::is_none", with = "time_serde::option")]
    pub completed_at: Option<SystemTime>,
}

pub(crate) mod time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let since_epoch = time
            .duration_since(UNIX_EPOCH)
            .map_err(serde::ser::Error::custom)?;
        since_epoch.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + std::time::Duration::from_secs(secs))
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use std::time::{SystemTime, UNIX_EPOCH};

        pub fn serialize<S>(time: &Option<SystemTime>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match time {
                Some(t) => super::serialize(t, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<SystemTime>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let secs: Option<u64> = Option::deserialize(deserializer)?;
            Ok(secs.map(|s| UNIX_EPOCH + std::time::Duration::from_secs(s)))
        }
    }
}
