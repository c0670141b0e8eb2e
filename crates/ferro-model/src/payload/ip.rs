use serde::{Deserialize, Serialize};

use crate::domain::{Element, TaskPayload, kind};

/// Payload for the deferred deletion of an IP allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpDelete {
    /// Allocation the address belongs to.
    pub allocation_id: String,
    /// The address to release.
    pub ip: String,
    /// Owning project.
    pub project: String,
}

impl Element for IpDelete {
    const KIND: &'static str = kind::IP_DELETE;
}

impl TaskPayload for IpDelete {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip() {
        let payload = IpDelete {
            allocation_id: "alloc-7".to_string(),
            ip: "10.0.0.4".to_string(),
            project: "p-acme".to_string(),
        };

        let json = serde_json::to_string(&payload).unwrap();
        let back: IpDelete = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn wire_shape_is_flat_camel_case() {
        let payload = IpDelete {
            allocation_id: "alloc-7".to_string(),
            ip: "10.0.0.4".to_string(),
            project: "p-acme".to_string(),
        };

        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(
            json,
            r#"{"allocationId":"alloc-7","ip":"10.0.0.4","project":"p-acme"}"#
        );
    }
}
