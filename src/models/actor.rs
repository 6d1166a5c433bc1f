//! Actor descriptor
//!
//! Identifies who triggered a mutating operation. Records written without
//! an actor carry the unknown/system sentinel.

use serde::{Deserialize, Serialize};

/// Serialized form of [`User::unknown`], used when serialization fails
pub const UNKNOWN_USER_JSON: &str = r#"{"name":"unknown","id":"system","class":"unknown"}"#;

/// Who performed an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub id: String,
    pub class: String,
}

impl User {
    pub fn new(name: impl Into<String>, id: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            class: class.into(),
        }
    }

    /// The sentinel actor for operations without actor context
    pub fn unknown() -> Self {
        Self::new("unknown", "system", "unknown")
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::unknown()
    }
}

impl Default for User {
    fn default() -> Self {
        Self::unknown()
    }
}
