//! Append-only JSON-lines change-log tables
//!
//! Each table is a file `<dir>/<table>.jsonl` where each line is one
//! complete change-log row. Every insert is flushed immediately.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;

use super::ChangeLogStore;
use crate::audit::ChangeLog;
use crate::config::LoggablePaths;
use crate::error::{LoggableError, LoggableResult};

/// File-backed change-log tables
pub struct JsonlStore {
    /// Directory holding one file per table
    dir: PathBuf,
    /// Serializes appends from concurrent operations
    write_lock: Mutex<()>,
}

impl JsonlStore {
    /// Create a store writing table files into `dir`
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store in the data directory of `paths`
    pub fn from_paths(paths: &LoggablePaths) -> Self {
        Self::new(paths.data_dir())
    }

    /// Directory holding the table files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `table`
    pub fn table_path(&self, table: &str) -> LoggableResult<PathBuf> {
        validate_table_name(table)?;
        Ok(self.dir.join(format!("{}.jsonl", table)))
    }

    /// Check if the file for `table` exists
    pub fn exists(&self, table: &str) -> bool {
        self.table_path(table).map(|p| p.exists()).unwrap_or(false)
    }

    /// Read all rows of `table` in write order
    pub fn read_all(&self, table: &str) -> LoggableResult<Vec<ChangeLog>> {
        let path = self.table_path(table)?;
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)
            .map_err(|e| LoggableError::Io(format!("Failed to open change log: {}", e)))?;

        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                LoggableError::Io(format!(
                    "Failed to read change log line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let record: ChangeLog = serde_json::from_str(&line).map_err(|e| {
                LoggableError::Json(format!(
                    "Failed to parse change log at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            records.push(record);
        }

        Ok(records)
    }

    /// Number of rows in `table`
    pub fn count(&self, table: &str) -> LoggableResult<usize> {
        Ok(self.read_all(table)?.len())
    }
}

impl ChangeLogStore for JsonlStore {
    fn insert(&self, table: &str, record: &mut ChangeLog) -> LoggableResult<()> {
        let path = self.table_path(table)?;

        let _guard = self.write_lock.lock().map_err(|e| {
            LoggableError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        fs::create_dir_all(&self.dir).map_err(|e| {
            LoggableError::Storage(format!(
                "Failed to create directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LoggableError::Storage(format!("Failed to open change log: {}", e)))?;

        record.created_at = Some(Utc::now());
        let json = serde_json::to_string(record)
            .map_err(|e| LoggableError::Json(format!("Failed to serialize change log: {}", e)))?;

        writeln!(file, "{}", json)
            .map_err(|e| LoggableError::Storage(format!("Failed to write change log: {}", e)))?;

        file.flush()
            .map_err(|e| LoggableError::Storage(format!("Failed to flush change log: {}", e)))?;

        Ok(())
    }

    fn records(&self, table: &str, object_id: &str) -> LoggableResult<Vec<ChangeLog>> {
        Ok(self
            .read_all(table)?
            .into_iter()
            .filter(|r| r.object_id == object_id)
            .collect())
    }

    fn get(&self, table: &str, record_id: &str) -> LoggableResult<Option<ChangeLog>> {
        Ok(self.read_all(table)?.into_iter().find(|r| r.id == record_id))
    }

    fn recent(&self, table: &str, count: usize) -> LoggableResult<Vec<ChangeLog>> {
        let all = self.read_all(table)?;
        let start = all.len().saturating_sub(count);
        Ok(all[start..].to_vec())
    }
}

/// Table names become file names, so keep them to a safe alphabet
fn validate_table_name(table: &str) -> LoggableResult<()> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(LoggableError::Config(format!(
            "Invalid change-log table name: {:?}",
            table
        )))
    }
}
