//! Change-log persistence
//!
//! The engine never owns a storage engine; it writes and queries change-log
//! rows through a [`ChangeLogStore`] provided by the host data layer. Two
//! implementations ship with the crate:
//!
//! - [`MemoryStore`]: in-process tables, for tests and embedding
//! - [`JsonlStore`]: one append-only JSON-lines file per table

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

use crate::audit::ChangeLog;
use crate::error::LoggableResult;

/// Write and query path for change-log rows
pub trait ChangeLogStore: Send + Sync {
    /// Persist `record` in `table`, assigning its `created_at`
    fn insert(&self, table: &str, record: &mut ChangeLog) -> LoggableResult<()>;

    /// All records of `object_id` in `table`, oldest first
    fn records(&self, table: &str, object_id: &str) -> LoggableResult<Vec<ChangeLog>>;

    /// Record with the given record identifier
    fn get(&self, table: &str, record_id: &str) -> LoggableResult<Option<ChangeLog>>;

    /// The most recent `count` records of `table`, oldest first
    fn recent(&self, table: &str, count: usize) -> LoggableResult<Vec<ChangeLog>>;

    /// Most recently created record of `object_id`
    fn last_record(&self, table: &str, object_id: &str) -> LoggableResult<Option<ChangeLog>> {
        Ok(self.records(table, object_id)?.pop())
    }

    /// Most recently created record of `object_id` written for `object_type`
    ///
    /// Tables may be shared by several entity types whose primary keys
    /// collide, so lazy update narrows the lookup by type.
    fn last_record_of(
        &self,
        table: &str,
        object_type: &str,
        object_id: &str,
    ) -> LoggableResult<Option<ChangeLog>> {
        Ok(self
            .records(table, object_id)?
            .into_iter()
            .rev()
            .find(|r| r.object_type == object_type))
    }
}
