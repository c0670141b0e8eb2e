use std::time::Duration;

use super::TaskId;

const DEFAULT_MAX_RETRY: u32 = 50;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// Per-task execution options applied at enqueue time.
///
/// Factory operations on the task client override these per task type; the
/// defaults here are the general-purpose budget for deferred deletions.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use ferro_model::TaskOptions;
///
/// let opts = TaskOptions::default()
///     .with_timeout(Duration::from_secs(60))
///     .with_retention(Duration::from_secs(30 * 24 * 3600));
///
/// assert_eq!(opts.max_retry, 50);
/// assert_eq!(opts.timeout, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct TaskOptions {
    /// Maximum number of retries after the first failed attempt.
    pub max_retry: u32,
    /// Deadline for a single handler invocation.
    pub timeout: Duration,
    /// How long a completed task is kept for inspection; `None` discards it
    /// as soon as it completes.
    pub retention: Option<Duration>,
    /// Explicit task ID. `None` assigns a random time-ordered one; a
    /// deterministic ID makes the enqueue unique per target.
    pub task_id: Option<TaskId>,
    /// Defer the first dispatch by this long (the task sits in `scheduled`).
    pub schedule_in: Option<Duration>,
    /// Queue the task is routed to.
    pub queue: Option<String>,
}

impl Default for TaskOptions {
    /// Defaults: 50 retries, 20 minute timeout, no retention, random ID,
    /// immediate dispatch on the default queue.
    fn default() -> Self {
        Self {
            max_retry: DEFAULT_MAX_RETRY,
            timeout: DEFAULT_TIMEOUT,
            retention: None,
            task_id: None,
            schedule_in: None,
            queue: None,
        }
    }
}

impl TaskOptions {
    pub fn with_max_retry(mut self, max_retry: u32) -> Self {
        self.max_retry = max_retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = Some(retention);
        self
    }

    pub fn with_task_id(mut self, task_id: TaskId) -> Self {
        self.task_id = Some(task_id);
        self
    }

    pub fn with_schedule_in(mut self, delay: Duration) -> Self {
        self.schedule_in = Some(delay);
        self
    }

    pub fn with_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = Some(queue.into());
        self
    }
}
