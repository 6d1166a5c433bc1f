//! Change-tracking core
//!
//! Records create, update and delete operations on loggable entities as
//! immutable change-log rows.
//!
//! # Architecture
//!
//! - `IdentityStore`: last observed snapshot per (object type, primary key),
//!   filled on reads and consulted on updates.
//! - `compute_diff`: field-level diff between two snapshots on an entity
//!   type's trackable fields.
//! - `ChangeLog`: the audit row itself, with actor, metadata and diff.
//! - `is_loggable` / `is_enabled`: the gates every hook checks first.
//! - `OperationContext`: actor and suppression flag of one host operation.
//!
//! # Example
//!
//! ```rust,ignore
//! use loggable::audit::{compute_diff, ChangeLog, OperationContext};
//!
//! let ctx = OperationContext::new().with_user(user);
//! let diff = compute_diff(&before, &after, &schema);
//! let record = ChangeLog::update(&entity, &ctx, diff.as_ref())?;
//! store.insert("change_logs", &mut record)?;
//! ```

mod capability;
mod context;
mod diff;
mod identity;
mod record;

pub use capability::{is_enabled, is_loggable};
pub use context::OperationContext;
pub use diff::{compute_diff, is_equal, DiffObject, UpdateDiff};
pub use identity::{IdentityKey, IdentityStore};
pub use record::{Action, ChangeLog, NULL_JSON};
