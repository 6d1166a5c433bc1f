//! Identity store
//!
//! Remembers the last observed snapshot of each entity, keyed by
//! (object type, primary key), to bridge the window between reading an
//! entity and later updating it. Last write wins.
//!
//! The store is unbounded unless a capacity is given; with a capacity the
//! least recently saved identity is evicted first.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::RwLock;

use serde_json::Value;

use crate::error::LoggableError;
use crate::models::{Model, PrimaryKey};

/// Composite key of one entity row
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    object_type: String,
    object_id: String,
}

impl IdentityKey {
    pub fn new(object_type: impl Into<String>, primary_key: &PrimaryKey) -> Self {
        Self {
            object_type: object_type.into(),
            object_id: primary_key.to_string(),
        }
    }

    /// Key of a host entity
    pub fn of<E: Model>(entity: &E) -> Self {
        Self::new(entity.table_name(), &entity.primary_key())
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    pub fn object_id(&self) -> &str {
        &self.object_id
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.object_type, self.object_id)
    }
}

#[derive(Debug, Default)]
struct Snapshots {
    entries: HashMap<IdentityKey, Value>,
    /// Save order, only maintained when the store is bounded
    order: VecDeque<IdentityKey>,
}

/// Concurrency-safe map from identity to last observed snapshot
#[derive(Debug, Default)]
pub struct IdentityStore {
    data: RwLock<Snapshots>,
    capacity: Option<usize>,
}

impl IdentityStore {
    /// Create an unbounded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding at most `capacity` snapshots
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: RwLock::new(Snapshots::default()),
            capacity: Some(capacity.max(1)),
        }
    }

    /// Record `snapshot` as the current state of `key`, replacing any prior entry
    pub fn save(&self, key: IdentityKey, snapshot: Value) -> Result<(), LoggableError> {
        let mut data = self.data.write().map_err(|e| {
            LoggableError::Storage(format!("Failed to acquire identity write lock: {}", e))
        })?;

        let Some(capacity) = self.capacity else {
            data.entries.insert(key, snapshot);
            return Ok(());
        };

        if data.entries.contains_key(&key) {
            data.order.retain(|k| k != &key);
        }
        data.order.push_back(key.clone());
        data.entries.insert(key, snapshot);

        while data.entries.len() > capacity {
            match data.order.pop_front() {
                Some(oldest) => {
                    data.entries.remove(&oldest);
                    tracing::debug!(identity = %oldest, "evicted snapshot");
                }
                None => break,
            }
        }

        Ok(())
    }

    /// Most recently saved snapshot for `key`, if any
    pub fn lookup(&self, key: &IdentityKey) -> Result<Option<Value>, LoggableError> {
        let data = self.data.read().map_err(|e| {
            LoggableError::Storage(format!("Failed to acquire identity read lock: {}", e))
        })?;

        Ok(data.entries.get(key).cloned())
    }

    /// Forget `key`, returning whether it was present
    pub fn remove(&self, key: &IdentityKey) -> Result<bool, LoggableError> {
        let mut data = self.data.write().map_err(|e| {
            LoggableError::Storage(format!("Failed to acquire identity write lock: {}", e))
        })?;

        let removed = data.entries.remove(key).is_some();
        if removed && self.capacity.is_some() {
            data.order.retain(|k| k != key);
        }
        Ok(removed)
    }

    /// Number of remembered snapshots
    pub fn len(&self) -> Result<usize, LoggableError> {
        let data = self.data.read().map_err(|e| {
            LoggableError::Storage(format!("Failed to acquire identity read lock: {}", e))
        })?;

        Ok(data.entries.len())
    }

    pub fn is_empty(&self) -> Result<bool, LoggableError> {
        Ok(self.len()? == 0)
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Drop every snapshot
    pub fn clear(&self) -> Result<(), LoggableError> {
        let mut data = self.data.write().map_err(|e| {
            LoggableError::Storage(format!("Failed to acquire identity write lock: {}", e))
        })?;

        data.entries.clear();
        data.order.clear();
        Ok(())
    }
}
