mod element;
pub use element::{Element, Topic};

mod task_payload;
pub use task_payload::TaskPayload;

pub mod kind;

mod error;
pub use error::PayloadError;

mod task_id;
pub use task_id::TaskId;

mod task_kind;
pub use task_kind::TaskKind;

mod task_state;
pub use task_state::TaskState;

mod task_options;
pub use task_options::TaskOptions;

mod task_info;
pub use task_info::TaskInfo;
pub(crate) use task_info::time_serde;

mod task_query;
pub use task_query::{TaskPage, TaskQuery};
