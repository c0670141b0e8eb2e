use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::domain::{Element, PayloadError, TaskPayload, kind, time_serde};

/// Management operation executed against a machine's BMC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BmcOp {
    PowerOn,
    PowerOff,
    PowerCycle,
    PowerReset,
    IdentifyOn,
    IdentifyOff,
}

impl BmcOp {
    /// Short symbolic identifier, used for logging and for deriving the
    /// deterministic task ID.
    pub fn as_str(&self) -> &'static str {
        match self {
            BmcOp::PowerOn => "power-on",
            BmcOp::PowerOff => "power-off",
            BmcOp::PowerCycle => "power-cycle",
            BmcOp::PowerReset => "power-reset",
            BmcOp::IdentifyOn => "identify-on",
            BmcOp::IdentifyOff => "identify-off",
        }
    }
}

/// Payload for an out-of-band command issued to a machine's BMC.
///
/// The hardware agent responsible for the machine pops this from its
/// point-to-point queue, executes it, and reports back with
/// [`BmcCommandDone`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BmcCommand {
    /// Target machine.
    pub machine_id: String,
    /// Partition the machine lives in.
    pub partition: String,
    /// The operation to perform.
    pub command: BmcOp,
    /// When the command was issued by the control plane.
    #[serde(with = "time_serde")]
    pub issued_at: SystemTime,
    /// Correlates the command with its completion report.
    pub command_id: String,
}

impl Element for BmcCommand {
    const KIND: &'static str = kind::BMC_COMMAND;
}

impl TaskPayload for BmcCommand {
    fn validate(&self) -> Result<(), PayloadError> {
        if self.machine_id.is_empty() {
            return Err(PayloadError::EmptyField("machineId"));
        }
        Ok(())
    }
}

/// Completion report for a [`BmcCommand`], sent back by the hardware agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BmcCommandDone {
    /// Set when the command failed on the agent side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Element for BmcCommandDone {
    const KIND: &'static str = "machine:bmc-command-done";
}
