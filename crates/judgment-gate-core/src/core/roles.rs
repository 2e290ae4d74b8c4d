// crates/judgment-gate-core/src/core/roles.rs
// ============================================================================
// Module: Judgment Gate Roles
// Description: Application role grants and operator role snapshots.
// Purpose: Model the inputs of the stage authorization predicate.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Role grants map a permission kind to the roles holding it on an
//! application. Operator roles are an immutable snapshot taken when a gate is
//! attached. Both default to empty so that a missing directory answer degrades
//! to "no grants known" instead of an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

// ============================================================================
// SECTION: Permission Kinds
// ============================================================================

/// Permission kinds granted to roles on an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionKind {
    /// Read-only visibility.
    Read,
    /// Write access.
    Write,
    /// Execute access (trigger and judge pipelines).
    Execute,
    /// Create access.
    Create,
}

impl PermissionKind {
    /// All permission kinds in declaration order.
    pub const ALL: [Self; 4] = [Self::Read, Self::Write, Self::Execute, Self::Create];

    /// Returns true when the permission allows mutating pipeline state.
    #[must_use]
    pub const fn confers_mutation(self) -> bool {
        !matches!(self, Self::Read)
    }
}

// ============================================================================
// SECTION: Role Grants
// ============================================================================

/// Roles granted each permission kind on one application.
///
/// # Invariants
/// - Missing kinds deserialize as empty sets; `null` is treated as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrantSet {
    /// Roles with READ access.
    #[serde(rename = "READ", default, deserialize_with = "nullable_roles")]
    pub read: BTreeSet<String>,
    /// Roles with WRITE access.
    #[serde(rename = "WRITE", default, deserialize_with = "nullable_roles")]
    pub write: BTreeSet<String>,
    /// Roles with EXECUTE access.
    #[serde(rename = "EXECUTE", default, deserialize_with = "nullable_roles")]
    pub execute: BTreeSet<String>,
    /// Roles with CREATE access.
    #[serde(rename = "CREATE", default, deserialize_with = "nullable_roles")]
    pub create: BTreeSet<String>,
}

impl RoleGrantSet {
    /// Returns an empty grant set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns a copy with `role` granted `kind`.
    #[must_use]
    pub fn with_grant(mut self, kind: PermissionKind, role: impl Into<String>) -> Self {
        self.roles_mut(kind).insert(role.into());
        self
    }

    /// Returns the roles granted `kind`.
    #[must_use]
    pub const fn roles(&self, kind: PermissionKind) -> &BTreeSet<String> {
        match kind {
            PermissionKind::Read => &self.read,
            PermissionKind::Write => &self.write,
            PermissionKind::Execute => &self.execute,
            PermissionKind::Create => &self.create,
        }
    }

    /// Returns true when `role` holds a permission that allows mutation.
    #[must_use]
    pub fn permits_mutation(&self, role: &str) -> bool {
        PermissionKind::ALL
            .into_iter()
            .filter(|kind| kind.confers_mutation())
            .any(|kind| self.roles(kind).contains(role))
    }

    /// Returns true when no role holds any permission.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        PermissionKind::ALL.into_iter().all(|kind| self.roles(kind).is_empty())
    }

    /// Mutable access to the roles granted `kind`.
    const fn roles_mut(&mut self, kind: PermissionKind) -> &mut BTreeSet<String> {
        match kind {
            PermissionKind::Read => &mut self.read,
            PermissionKind::Write => &mut self.write,
            PermissionKind::Execute => &mut self.execute,
            PermissionKind::Create => &mut self.create,
        }
    }
}

/// Decodes a role list that may be absent or `null`.
fn nullable_roles<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeSet<String>>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// SECTION: Operator Roles
// ============================================================================

/// Role memberships of the authenticated operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorRoles(BTreeSet<String>);

impl OperatorRoles {
    /// Creates an operator role snapshot.
    #[must_use]
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(roles.into_iter().map(Into::into).collect())
    }

    /// Iterates roles in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
