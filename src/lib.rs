//! entity-loggable - change-log audit trail for data-layer entities
//!
//! This library attaches to a relational data layer's read, create, update
//! and delete lifecycle and records, for every mutation of an opted-in
//! entity, who made it, the entity's full state and a field-level diff.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Settings and path management
//! - `error`: Custom error types
//! - `models`: Host entity contracts, trackable field sets, actor descriptor
//! - `audit`: Identity store, diff engine, change-log records, capability gates
//! - `storage`: Change-log write/query path (in-memory and JSON-lines)
//! - `plugin`: Lifecycle hooks the host data layer calls
//! - `cli` / `display`: Read-only change-log viewer
//!
//! # Example
//!
//! ```rust,ignore
//! use loggable::audit::OperationContext;
//! use loggable::plugin::{Plugin, Scope};
//! use loggable::storage::MemoryStore;
//!
//! let plugin = Plugin::register("change_logs")?;
//! let store = MemoryStore::new();
//! let ctx = OperationContext::new().with_user(user);
//!
//! plugin.after_create(&Scope::one(&product, &ctx, &store))?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod plugin;
pub mod storage;

pub use error::{LoggableError, LoggableResult};
pub use plugin::Plugin;
