use serde::{Deserialize, Serialize};

use crate::domain::{Element, TaskPayload, kind};

/// Payload for the deferred deletion of a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDelete {
    /// The network to remove.
    pub network_id: String,
}

impl Element for NetworkDelete {
    const KIND: &'static str = kind::NETWORK_DELETE;
}

impl TaskPayload for NetworkDelete {}
