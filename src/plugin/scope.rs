//! Hook invocation scope
//!
//! What the host hands to a lifecycle hook: the affected entity or entities,
//! the operation context and the store the change-log row is written to.

use crate::audit::OperationContext;
use crate::storage::ChangeLogStore;

/// Entity value(s) affected by one host operation
#[derive(Debug)]
pub enum Target<'a, E> {
    One(&'a E),
    Many(&'a [E]),
}

impl<'a, E> Clone for Target<'a, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, E> Copy for Target<'a, E> {}

impl<'a, E> Target<'a, E> {
    /// Iterate the affected entities
    pub fn iter(&self) -> std::slice::Iter<'a, E> {
        match *self {
            Target::One(entity) => std::slice::from_ref(entity).iter(),
            Target::Many(entities) => entities.iter(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Target::One(_) => 1,
            Target::Many(entities) => entities.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One lifecycle hook invocation
pub struct Scope<'a, E> {
    target: Target<'a, E>,
    ctx: &'a OperationContext,
    store: &'a dyn ChangeLogStore,
}

impl<'a, E> Scope<'a, E> {
    pub fn new(target: Target<'a, E>, ctx: &'a OperationContext, store: &'a dyn ChangeLogStore) -> Self {
        Self { target, ctx, store }
    }

    /// Scope over a single entity
    pub fn one(entity: &'a E, ctx: &'a OperationContext, store: &'a dyn ChangeLogStore) -> Self {
        Self::new(Target::One(entity), ctx, store)
    }

    /// Scope over a query result set
    pub fn many(entities: &'a [E], ctx: &'a OperationContext, store: &'a dyn ChangeLogStore) -> Self {
        Self::new(Target::Many(entities), ctx, store)
    }

    pub fn target(&self) -> Target<'a, E> {
        self.target
    }

    pub fn context(&self) -> &'a OperationContext {
        self.ctx
    }

    pub fn store(&self) -> &'a dyn ChangeLogStore {
        self.store
    }
}
