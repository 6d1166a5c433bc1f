//! Trackable field sets
//!
//! An [`EntitySchema`] is built once per entity type from the type's
//! declared [`FieldDescriptor`]s and cached in a [`SchemaCache`], so the
//! hooks never re-derive field lists or snake-case names per call.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use super::case::to_snake_case;
use super::entity::{Loggable, Model};
use crate::error::LoggableError;

/// One declared field of an entity, keyed by its serialized name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Key the field has in the entity's serialized form
    pub name: &'static str,
    /// Whether changes to this field show up in diffs
    pub trackable: bool,
}

impl FieldDescriptor {
    /// A field that participates in diffs
    pub const fn tracked(name: &'static str) -> Self {
        Self {
            name,
            trackable: true,
        }
    }

    /// A field excluded from diffs (timestamps, internal flags, ...)
    pub const fn untracked(name: &'static str) -> Self {
        Self {
            name,
            trackable: false,
        }
    }
}

/// A trackable field with its normalized diff key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedField {
    /// Key in the serialized entity
    pub key: String,
    /// snake_case key used in diffs
    pub snake: String,
}

/// Trackable field set of one entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySchema {
    object_type: String,
    fields: Vec<TrackedField>,
}

impl EntitySchema {
    /// Build a schema from declared fields, keeping declaration order
    pub fn from_descriptors(object_type: impl Into<String>, fields: &[FieldDescriptor]) -> Self {
        let mut seen = HashSet::new();
        let fields = fields
            .iter()
            .filter(|f| f.trackable)
            .filter(|f| seen.insert(f.name))
            .map(|f| TrackedField {
                key: f.name.to_string(),
                snake: to_snake_case(f.name),
            })
            .collect();

        Self {
            object_type: object_type.into(),
            fields,
        }
    }

    /// Table/type name this schema describes
    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    /// Trackable fields in declaration order
    pub fn fields(&self) -> &[TrackedField] {
        &self.fields
    }

    /// Find a trackable field by serialized key or snake_case name
    pub fn resolve(&self, name: &str) -> Option<&TrackedField> {
        self.fields
            .iter()
            .find(|f| f.key == name || f.snake == name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Per-type cache of entity schemas
#[derive(Debug, Default)]
pub struct SchemaCache {
    schemas: RwLock<HashMap<TypeId, Arc<EntitySchema>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the schema for `E`, building it from `loggable` on first use
    pub fn schema_for<E>(
        &self,
        entity: &E,
        loggable: &dyn Loggable,
    ) -> Result<Arc<EntitySchema>, LoggableError>
    where
        E: Model + 'static,
    {
        let type_id = TypeId::of::<E>();

        {
            let schemas = self.schemas.read().map_err(|e| {
                LoggableError::Storage(format!("Failed to acquire schema read lock: {}", e))
            })?;
            if let Some(schema) = schemas.get(&type_id) {
                return Ok(Arc::clone(schema));
            }
        }

        let schema = Arc::new(EntitySchema::from_descriptors(
            entity.table_name(),
            loggable.fields(),
        ));

        let mut schemas = self.schemas.write().map_err(|e| {
            LoggableError::Storage(format!("Failed to acquire schema write lock: {}", e))
        })?;
        Ok(Arc::clone(schemas.entry(type_id).or_insert(schema)))
    }

    /// Number of cached schemas
    pub fn len(&self) -> usize {
        self.schemas.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
