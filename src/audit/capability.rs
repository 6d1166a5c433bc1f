//! Capability predicates
//!
//! Both checks run before any snapshot, diff or record work happens.

use super::context::OperationContext;
use crate::models::Model;

/// True iff the entity's type opted into auditing
pub fn is_loggable<E: Model>(entity: &E) -> bool {
    entity.as_loggable().is_some()
}

/// True iff auditing is not suppressed for this entity and operation
///
/// Non-loggable entities are never enabled.
pub fn is_enabled<E: Model>(entity: &E, ctx: &OperationContext) -> bool {
    if ctx.is_suppressed() {
        return false;
    }
    entity.as_loggable().map_or(false, |l| l.is_enabled())
}
