//! Entity model for the change-log engine
//!
//! This module contains the contracts host entities implement, their cached
//! trackable field sets, the actor descriptor and field-name normalization.

pub mod actor;
pub mod case;
pub mod entity;
pub mod schema;

pub use actor::{User, UNKNOWN_USER_JSON};
pub use case::to_snake_case;
pub use entity::{Loggable, Model, PrimaryKey};
pub use schema::{EntitySchema, FieldDescriptor, SchemaCache, TrackedField};
