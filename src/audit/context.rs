//! Per-operation context
//!
//! Carries the actor and the per-call suppression switch into each hook
//! call explicitly instead of through ambient state.

use crate::models::User;

/// Context of one host operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationContext {
    user: Option<User>,
    suppressed: bool,
}

impl OperationContext {
    /// Context with no actor and auditing active
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the actor performing the operation
    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    /// Suppress auditing for this operation (bulk imports, migrations)
    pub fn suppressed(mut self) -> Self {
        self.suppressed = true;
        self
    }

    /// Toggle suppression explicitly
    pub fn with_suppression(mut self, suppressed: bool) -> Self {
        self.suppressed = suppressed;
        self
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }
}
