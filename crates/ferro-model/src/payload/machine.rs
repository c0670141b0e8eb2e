use serde::{Deserialize, Serialize};

use crate::domain::{Element, PayloadError, TaskPayload, kind};

/// Payload for the deferred deletion of a machine and/or its allocation.
///
/// At least one of the two IDs must be set. Deleting by allocation ID only is
/// valid (the machine outlives the allocation), which is why both fields are
/// optional and omitted from the wire when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineDelete {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation_id: Option<String>,
}

impl Element for MachineDelete {
    const KIND: &'static str = kind::MACHINE_DELETE;
}

impl TaskPayload for MachineDelete {
    fn validate(&self) -> Result<(), PayloadError> {
        if self.machine_id.is_none() && self.allocation_id.is_none() {
            return Err(PayloadError::MissingTarget);
        }
        Ok(())
    }
}

/// Payload for the machine allocation workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineAllocation {
    /// Allocation being fulfilled.
    pub allocation_id: String,
    /// Machine selected for the allocation.
    pub machine_id: String,
    /// Owning project.
    pub project: String,
}

impl Element for MachineAllocation {
    const KIND: &'static str = kind::MACHINE_ALLOCATION;
}

impl TaskPayload for MachineAllocation {}
