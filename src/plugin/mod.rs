//! Lifecycle hooks for the host data layer
//!
//! The host calls one hook per lifecycle event:
//!
//! - `after_query`: remembers the loaded state of loggable entities
//! - `after_create`: writes a `create` record
//! - `after_update`: writes an `update` record with a field diff, unless the
//!   lazy-update check finds nothing changed since the last record
//! - `after_delete`: writes a `delete` record
//!
//! Failures while building a record are logged and swallowed so auditing
//! never breaks the host's own write. Failures writing the record are
//! returned to the host.

mod hooks;
mod scope;

pub use scope::{Scope, Target};

use crate::audit::{ChangeLog, IdentityStore};
use crate::config::Settings;
use crate::error::LoggableResult;
use crate::models::SchemaCache;
use crate::storage::ChangeLogStore;

/// The change-log engine attached to one host data layer
#[derive(Debug)]
pub struct Plugin {
    settings: Settings,
    identity: IdentityStore,
    schemas: SchemaCache,
}

impl Plugin {
    /// Create an engine with the given settings
    pub fn new(settings: Settings) -> LoggableResult<Self> {
        settings.validate()?;

        let identity = match settings.identity_capacity {
            Some(capacity) => IdentityStore::with_capacity(capacity),
            None => IdentityStore::new(),
        };

        Ok(Self {
            settings,
            identity,
            schemas: SchemaCache::new(),
        })
    }

    /// Create an engine writing to `table_name` with default settings
    pub fn register(table_name: impl Into<String>) -> LoggableResult<Self> {
        Self::new(Settings::new(table_name))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Change-log table records are written to
    pub fn table_name(&self) -> &str {
        &self.settings.table_name
    }

    /// Snapshots remembered from reads and writes
    pub fn identity(&self) -> &IdentityStore {
        &self.identity
    }

    /// Most recent record of `object_id`
    pub fn last_record(
        &self,
        store: &dyn ChangeLogStore,
        object_id: &str,
    ) -> LoggableResult<Option<ChangeLog>> {
        store.last_record(self.table_name(), object_id)
    }

    /// Every record of `object_id`, oldest first
    pub fn history(
        &self,
        store: &dyn ChangeLogStore,
        object_id: &str,
    ) -> LoggableResult<Vec<ChangeLog>> {
        store.records(self.table_name(), object_id)
    }
}
