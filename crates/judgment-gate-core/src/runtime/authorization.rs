// crates/judgment-gate-core/src/runtime/authorization.rs
// ============================================================================
// Module: Judgment Gate Authorization
// Description: Stage-level role authorization for manual judgments.
// Purpose: Decide whether the operator may judge a specific stage.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! Authorization is a pure set predicate. A stage without a role allowlist is
//! open to any authenticated operator. A restricted stage requires a role the
//! operator holds, that the stage lists, and that the application grants a
//! mutating permission (WRITE, EXECUTE, or CREATE). READ never qualifies.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Serialize;

use crate::core::OperatorRoles;
use crate::core::RoleGrantSet;

// ============================================================================
// SECTION: Decisions
// ============================================================================

/// Outcome of a stage authorization check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AuthorizationDecision {
    /// Stage declares no role restriction.
    Unrestricted,
    /// Operator holds a designated role with a mutating grant.
    Granted {
        /// Lexicographically first qualifying role.
        role: String,
    },
    /// Operator holds none of the stage roles.
    NotDesignated,
    /// Operator holds a stage role but none has a mutating grant.
    MissingMutationGrant,
}

impl AuthorizationDecision {
    /// Returns true when the operator may judge the stage.
    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        matches!(self, Self::Unrestricted | Self::Granted { .. })
    }

    /// Returns a stable label for audit output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Unrestricted => "unrestricted",
            Self::Granted {
                ..
            } => "granted",
            Self::NotDesignated => "not_designated",
            Self::MissingMutationGrant => "missing_mutation_grant",
        }
    }
}

// ============================================================================
// SECTION: Evaluator
// ============================================================================

/// Evaluates stage authorization against role grants.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationEvaluator;

impl AuthorizationEvaluator {
    /// Evaluates whether the operator may judge a stage.
    #[must_use]
    pub fn evaluate(
        stage_roles: &BTreeSet<String>,
        grants: &RoleGrantSet,
        operator_roles: &OperatorRoles,
    ) -> AuthorizationDecision {
        if stage_roles.is_empty() {
            return AuthorizationDecision::Unrestricted;
        }
        let mut designated = operator_roles.iter().filter(|role| stage_roles.contains(*role));
        let Some(first) = designated.next() else {
            return AuthorizationDecision::NotDesignated;
        };
        std::iter::once(first)
            .chain(designated)
            .find(|role| grants.permits_mutation(role))
            .map_or(AuthorizationDecision::MissingMutationGrant, |role| {
                AuthorizationDecision::Granted {
                    role: role.to_string(),
                }
            })
    }
}

/// Returns true when the operator may judge a stage with `stage_roles`.
#[must_use]
pub fn is_authorized(
    stage_roles: &BTreeSet<String>,
    grants: &RoleGrantSet,
    operator_roles: &OperatorRoles,
) -> bool {
    AuthorizationEvaluator::evaluate(stage_roles, grants, operator_roles).is_authorized()
}
