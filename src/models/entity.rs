//! Host entity contracts
//!
//! [`Model`] is what the host data layer hands to the lifecycle hooks for
//! every row it manages. [`Loggable`] is the explicit opt-in: a type only
//! participates in auditing when its `Model::as_loggable` returns `Some`.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::schema::FieldDescriptor;

/// Primary-key value of a host row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryKey {
    Int(i64),
    Uint(u64),
    Uuid(Uuid),
    Text(String),
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimaryKey::Int(v) => write!(f, "{}", v),
            PrimaryKey::Uint(v) => write!(f, "{}", v),
            PrimaryKey::Uuid(v) => write!(f, "{}", v),
            PrimaryKey::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for PrimaryKey {
    fn from(v: i64) -> Self {
        PrimaryKey::Int(v)
    }
}

impl From<i32> for PrimaryKey {
    fn from(v: i32) -> Self {
        PrimaryKey::Int(v.into())
    }
}

impl From<u64> for PrimaryKey {
    fn from(v: u64) -> Self {
        PrimaryKey::Uint(v)
    }
}

impl From<u32> for PrimaryKey {
    fn from(v: u32) -> Self {
        PrimaryKey::Uint(v.into())
    }
}

impl From<Uuid> for PrimaryKey {
    fn from(v: Uuid) -> Self {
        PrimaryKey::Uuid(v)
    }
}

impl From<String> for PrimaryKey {
    fn from(v: String) -> Self {
        PrimaryKey::Text(v)
    }
}

impl From<&str> for PrimaryKey {
    fn from(v: &str) -> Self {
        PrimaryKey::Text(v.to_string())
    }
}

/// A row managed by the host data layer
pub trait Model: Serialize {
    /// Table (object type) the row belongs to
    fn table_name(&self) -> &str;

    /// Primary-key value of this row
    fn primary_key(&self) -> PrimaryKey;

    /// Auditing capability, if this type opted in
    fn as_loggable(&self) -> Option<&dyn Loggable> {
        None
    }
}

/// Opt-in capability for entities whose changes are recorded
pub trait Loggable {
    /// Declared fields in serialized-name form, with their tracking flag
    fn fields(&self) -> &'static [FieldDescriptor];

    /// Instance-level switch; `false` suppresses auditing for this value
    fn is_enabled(&self) -> bool {
        true
    }

    /// Optional caller-defined metadata stored with every record
    fn meta(&self) -> Option<serde_json::Value> {
        None
    }
}
