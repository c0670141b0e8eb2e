use super::{Element, PayloadError};

/// A payload type the durable task server can dispatch on.
///
/// [`Element::KIND`] doubles as the task type identifier (see
/// [`kind`](crate::kind)); handlers are resolved by it at dispatch time.
/// `validate` runs at enqueue time, before the payload is serialized.
pub trait TaskPayload: Element {
    /// Checks payload invariants that the type system cannot express.
    fn validate(&self) -> Result<(), PayloadError> {
        Ok(())
    }
}
