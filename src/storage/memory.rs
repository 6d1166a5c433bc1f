//! In-memory change-log tables

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use super::ChangeLogStore;
use crate::audit::ChangeLog;
use crate::error::{LoggableError, LoggableResult};

/// Change-log tables held in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<ChangeLog>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record of `table`, in insertion order
    pub fn all(&self, table: &str) -> LoggableResult<Vec<ChangeLog>> {
        let tables = self.tables.read().map_err(|e| {
            LoggableError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(tables.get(table).cloned().unwrap_or_default())
    }

    /// Number of records in `table`
    pub fn count(&self, table: &str) -> LoggableResult<usize> {
        let tables = self.tables.read().map_err(|e| {
            LoggableError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(tables.get(table).map_or(0, Vec::len))
    }
}

impl ChangeLogStore for MemoryStore {
    fn insert(&self, table: &str, record: &mut ChangeLog) -> LoggableResult<()> {
        let mut tables = self.tables.write().map_err(|e| {
            LoggableError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        record.created_at = Some(Utc::now());
        tables
            .entry(table.to_string())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    fn records(&self, table: &str, object_id: &str) -> LoggableResult<Vec<ChangeLog>> {
        let tables = self.tables.read().map_err(|e| {
            LoggableError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| r.object_id == object_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn get(&self, table: &str, record_id: &str) -> LoggableResult<Option<ChangeLog>> {
        let tables = self.tables.read().map_err(|e| {
            LoggableError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(tables
            .get(table)
            .and_then(|rows| rows.iter().find(|r| r.id == record_id).cloned()))
    }

    fn recent(&self, table: &str, count: usize) -> LoggableResult<Vec<ChangeLog>> {
        let all = self.all(table)?;
        let start = all.len().saturating_sub(count);
        Ok(all[start..].to_vec())
    }

    fn last_record_of(
        &self,
        table: &str,
        object_type: &str,
        object_id: &str,
    ) -> LoggableResult<Option<ChangeLog>> {
        let tables = self.tables.read().map_err(|e| {
            LoggableError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(tables.get(table).and_then(|rows| {
            rows.iter()
                .rev()
                .find(|r| r.object_id == object_id && r.object_type == object_type)
                .cloned()
        }))
    }
}
