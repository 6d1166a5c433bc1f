//! Change-log records
//!
//! A [`ChangeLog`] is the immutable audit row written once per create,
//! update or delete of a loggable entity. JSON-typed columns are stored as
//! JSON text so the row maps one-to-one onto a relational table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::context::OperationContext;
use super::diff::UpdateDiff;
use crate::error::{LoggableError, LoggableResult};
use crate::models::{Model, User, UNKNOWN_USER_JSON};

/// Serialized absence used for `raw_diff` and `raw_meta`
pub const NULL_JSON: &str = "null";

/// Types of actions that are recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Entity was created
    Create,
    /// Entity was updated
    Update,
    /// Entity was deleted
    Delete,
}

impl Action {
    /// Column value of this action
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Create => write!(f, "CREATE"),
            Action::Update => write!(f, "UPDATE"),
            Action::Delete => write!(f, "DELETE"),
        }
    }
}

/// A single change-log row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeLog {
    /// Random unique record identifier
    pub id: String,

    /// Kind of change
    pub action: Action,

    /// String form of the entity's primary key
    pub object_id: String,

    /// Table/type name of the entity
    pub object_type: String,

    /// Full entity state at event time (JSON text)
    pub raw_object: String,

    /// Field diff for updates, `"null"` otherwise (JSON text)
    pub raw_diff: String,

    /// Entity-supplied metadata or `"null"` (JSON text)
    pub raw_meta: String,

    /// Actor descriptor (JSON text)
    pub created_by: String,

    /// Assigned by the store when the row is written
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ChangeLog {
    /// Build a record for `entity`, serializing its current state
    pub fn new<E: Model>(entity: &E, action: Action, ctx: &OperationContext) -> LoggableResult<Self> {
        let snapshot = serde_json::to_value(entity)
            .map_err(|e| LoggableError::Json(format!("Failed to serialize entity: {}", e)))?;
        Self::from_snapshot(entity, &snapshot, action, ctx)
    }

    /// Build a record from an already-taken snapshot of `entity`
    pub fn from_snapshot<E: Model>(
        entity: &E,
        snapshot: &Value,
        action: Action,
        ctx: &OperationContext,
    ) -> LoggableResult<Self> {
        let raw_object = serde_json::to_string(snapshot)
            .map_err(|e| LoggableError::Json(format!("Failed to serialize entity: {}", e)))?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            action,
            object_id: entity.primary_key().to_string(),
            object_type: entity.table_name().to_string(),
            raw_object,
            raw_diff: NULL_JSON.to_string(),
            raw_meta: raw_meta(entity),
            created_by: raw_actor(ctx.user()),
            created_at: None,
        })
    }

    /// Build a create record
    pub fn create<E: Model>(entity: &E, ctx: &OperationContext) -> LoggableResult<Self> {
        Self::new(entity, Action::Create, ctx)
    }

    /// Build an update record, attaching `diff` when present
    pub fn update<E: Model>(
        entity: &E,
        ctx: &OperationContext,
        diff: Option<&UpdateDiff>,
    ) -> LoggableResult<Self> {
        let record = Self::new(entity, Action::Update, ctx)?;
        match diff {
            Some(diff) => record.with_diff(diff),
            None => Ok(record),
        }
    }

    /// Build a delete record
    pub fn delete<E: Model>(entity: &E, ctx: &OperationContext) -> LoggableResult<Self> {
        Self::new(entity, Action::Delete, ctx)
    }

    /// Attach a serialized diff
    pub fn with_diff(mut self, diff: &UpdateDiff) -> LoggableResult<Self> {
        self.raw_diff = serde_json::to_string(diff)
            .map_err(|e| LoggableError::Json(format!("Failed to serialize diff: {}", e)))?;
        Ok(self)
    }

    /// Parsed entity state
    pub fn object(&self) -> LoggableResult<Value> {
        Ok(serde_json::from_str(&self.raw_object)?)
    }

    /// Parsed diff, `None` for create/delete rows and diff-less updates
    pub fn diff(&self) -> LoggableResult<Option<UpdateDiff>> {
        Ok(serde_json::from_str(&self.raw_diff)?)
    }

    /// Parsed metadata, `None` when the entity supplied none
    pub fn meta(&self) -> LoggableResult<Option<Value>> {
        let meta: Value = serde_json::from_str(&self.raw_meta)?;
        Ok(if meta.is_null() { None } else { Some(meta) })
    }

    /// Parsed actor, falling back to the unknown sentinel
    pub fn actor(&self) -> User {
        serde_json::from_str(&self.created_by).unwrap_or_else(|_| User::unknown())
    }

    /// Format the record for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = match self.created_at {
            Some(at) => format!("[{}] ", at.format("%Y-%m-%d %H:%M:%S UTC")),
            None => String::new(),
        };

        output.push_str(&format!(
            "{} {} {} by {}",
            self.action,
            self.object_type,
            self.object_id,
            self.actor().name
        ));

        if let Ok(Some(diff)) = self.diff() {
            output.push_str(&format!("\n  Changes: {}", diff.summary()));
        }

        output
    }
}

/// Serialize the actor, substituting the sentinel when absent or unserializable
fn raw_actor(user: Option<&User>) -> String {
    let user = user.cloned().unwrap_or_else(User::unknown);
    match serde_json::to_string(&user) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize actor, using unknown actor");
            UNKNOWN_USER_JSON.to_string()
        }
    }
}

/// Serialize entity metadata best-effort
fn raw_meta<E: Model>(entity: &E) -> String {
    let Some(meta) = entity.as_loggable().and_then(|l| l.meta()) else {
        return NULL_JSON.to_string();
    };

    match serde_json::to_string(&meta) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(
                object_type = entity.table_name(),
                error = %e,
                "failed to serialize change-log metadata"
            );
            NULL_JSON.to_string()
        }
    }
}
