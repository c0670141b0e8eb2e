use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// A value that can travel through the notification bus or the point-to-point
/// queue, addressable by a stable kind string.
///
/// `KIND` is part of the wire contract: it is appended to the caller-supplied
/// prefix to form the topic name, so two payload types sharing a prefix can
/// never cross-deliver. Renaming it is a breaking change for every process
/// attached to the same store.
///
/// # Example
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use ferro_model::{Element, Topic};
///
/// #[derive(Serialize, Deserialize)]
/// struct MachineReady {
///     machine_id: String,
/// }
///
/// impl Element for MachineReady {
///     const KIND: &'static str = "machine-ready";
/// }
///
/// assert_eq!(Topic::of::<MachineReady>("fleet").as_str(), "fleet:machine-ready");
/// ```
pub trait Element: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Stable type identifier, unique across all element types.
    const KIND: &'static str;
}

/// Name of a broadcast topic in the backing store.
///
/// Derived deterministically as `"<prefix>:<kind>"`; the same `(prefix, type)`
/// pair always maps to the same topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(String);

impl Topic {
    /// Builds the topic for element type `T` under the given prefix.
    pub fn of<T: Element>(prefix: &str) -> Self {
        Self(format!("{prefix}:{}", T::KIND))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Ping;

    #[derive(Serialize, Deserialize)]
    struct Pong;

    impl Element for Ping {
        const KIND: &'static str = "ping";
    }

    impl Element for Pong {
        const KIND: &'static str = "pong";
    }

    #[test]
    fn topic_is_deterministic() {
        assert_eq!(Topic::of::<Ping>("core").as_str(), "core:ping");
        assert_eq!(Topic::of::<Ping>("core"), Topic::of::<Ping>("core"));
    }

    #[test]
    fn distinct_types_never_share_a_topic() {
        assert_ne!(Topic::of::<Ping>("core"), Topic::of::<Pong>("core"));
    }
}
