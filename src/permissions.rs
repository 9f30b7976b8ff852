//! Team-scoped permission gate.
//!
//! Personal scope always allows everything. Team scope allows only the
//! capabilities loaded for the active `(user, team)` pair; until a load
//! succeeds the set is empty, so a team switch is fail-closed. Every mutating
//! operation consults the gate before issuing any network call.

use std::collections::HashSet;

use crate::error::SyncError;
use crate::types::TeamScope;

/// Capability strings as served by the team permissions endpoint.
pub mod caps {
    pub const TASK_CREATE: &str = "task.create";
    pub const TASK_UPDATE: &str = "task.update";
    pub const TASK_ASSIGN: &str = "task.assign";
    pub const ATTACHMENT_UPLOAD: &str = "attachment.upload";
    pub const ATTACHMENT_DELETE: &str = "attachment.delete";
    pub const CONTRACT_CREATE: &str = "contract.create";
    pub const CONTRACT_DELETE: &str = "contract.delete";
    pub const COMMENT_CREATE: &str = "comment.create";
    pub const MEMBER_MANAGE: &str = "member.manage";
}

#[derive(Debug, Clone, Default)]
pub struct PermissionGate {
    scope: TeamScope,
    capabilities: HashSet<String>,
}

impl PermissionGate {
    pub fn personal() -> Self {
        Self::default()
    }

    pub fn scope(&self) -> TeamScope {
        self.scope
    }

    /// Switch scope. Capabilities are cleared — a team scope denies
    /// everything until `replace` installs the freshly loaded set.
    pub fn set_scope(&mut self, scope: TeamScope) {
        self.scope = scope;
        self.capabilities.clear();
    }

    /// Install a freshly loaded capability set, replacing (never merging)
    /// the previous one.
    pub fn replace(&mut self, capabilities: Vec<String>) {
        self.capabilities = capabilities.into_iter().collect();
    }

    /// Drop all capabilities (fail-closed on load failure).
    pub fn clear(&mut self) {
        self.capabilities.clear();
    }

    pub fn has_permission(&self, capability: &str) -> bool {
        match self.scope {
            TeamScope::Personal => true,
            TeamScope::Team(_) => self.capabilities.contains(capability),
        }
    }

    /// Gate check used by mutating operations: `Err(PermissionDenied)`
    /// before any network call, state untouched.
    pub fn require(&self, capability: &str, action: &str) -> Result<(), SyncError> {
        if self.has_permission(capability) {
            Ok(())
        } else {
            Err(SyncError::PermissionDenied(action.to_string()))
        }
    }
}
