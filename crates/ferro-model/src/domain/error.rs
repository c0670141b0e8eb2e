use thiserror::Error;

/// Validation errors for task payloads, raised at enqueue time.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Machine deletion needs a machine ID, an allocation ID, or both.
    #[error("machine delete requires a machine id or an allocation id")]
    MissingTarget,

    /// A required field was empty.
    #[error("field {0} must not be empty")]
    EmptyField(&'static str),
}
