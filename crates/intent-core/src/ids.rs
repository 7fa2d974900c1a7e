//! Branded ID newtypes for type safety.
//!
//! A session ID and a trace entry ID are both strings on the wire, but they
//! are never interchangeable. Session IDs are UUID v7 (time-ordered); trace
//! IDs are random UUID v4.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident, $gen:expr) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random ID.
            #[must_use]
            pub fn new() -> Self {
                Self($gen.to_string())
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

branded_id! {
    /// Unique identifier for an agent session (used as the conversation URL in traces).
    SessionId, Uuid::now_v7()
}

branded_id! {
    /// Unique identifier for one ledger entry.
    TraceId, Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        assert_ne!(TraceId::new(), TraceId::new());
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn trace_id_is_uuid_v4() {
        let id = TraceId::new();
        let parsed = Uuid::parse_str(id.as_str()).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn serde_is_transparent() {
        let id = SessionId::from("task-42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"task-42\"");
        let back: SessionId = serde_json::from_str("\"task-42\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn display_and_conversions() {
        let id = TraceId::from("abc".to_string());
        assert_eq!(id.to_string(), "abc");
        assert_eq!(id.as_ref(), "abc");
        let s: String = id.into();
        assert_eq!(s, "abc");
    }
}
