// crates/judgment-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Judgment Gate Interfaces
// Description: Contracts for the permission directory, identity, and transport.
// Purpose: Define the collaborator seams the gate runtime depends on.
// Dependencies: async-trait, crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! The gate never talks to a pipeline backend directly. Role grants, operator
//! identity, and judgment submission arrive through the traits below so hosts
//! can back them with HTTP clients, fixtures, or in-process services.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::ApplicationName;
use crate::core::ExecutionId;
use crate::core::JudgmentDecision;
use crate::core::OperatorRoles;
use crate::core::RoleGrantSet;
use crate::core::StageId;

// ============================================================================
// SECTION: Permission Directory
// ============================================================================

/// Permission directory errors.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Directory could not be reached.
    #[error("permission directory unavailable: {0}")]
    Unavailable(String),
    /// Directory answered with data that could not be decoded.
    #[error("permission directory returned invalid data: {0}")]
    Invalid(String),
}

/// Source of application role grants.
#[async_trait]
pub trait PermissionDirectory: Send + Sync {
    /// Loads the role grants for an application.
    ///
    /// Returns `Ok(None)` when the directory has no permissions on record.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the lookup fails.
    async fn application_permissions(
        &self,
        application: &ApplicationName,
    ) -> Result<Option<RoleGrantSet>, DirectoryError>;
}

// ============================================================================
// SECTION: Identity Provider
// ============================================================================

/// Source of the authenticated operator's roles.
pub trait IdentityProvider: Send + Sync {
    /// Returns a snapshot of the operator's role memberships.
    fn operator_roles(&self) -> OperatorRoles;
}

/// Identity provider backed by a fixed snapshot.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    /// Snapshot returned to callers.
    roles: OperatorRoles,
}

impl StaticIdentity {
    /// Creates an identity provider returning `roles`.
    #[must_use]
    pub const fn new(roles: OperatorRoles) -> Self {
        Self {
            roles,
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn operator_roles(&self) -> OperatorRoles {
        self.roles.clone()
    }
}

// ============================================================================
// SECTION: Judgment Transport
// ============================================================================

/// Judgment submission sent to the pipeline backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgmentRequest {
    /// Owning application.
    pub application: ApplicationName,
    /// Execution identifier.
    pub execution_id: ExecutionId,
    /// Stage identifier.
    pub stage_id: StageId,
    /// Chosen decision.
    pub decision: JudgmentDecision,
    /// Selected option value, when one was chosen.
    pub selected_option: Option<String>,
    /// Freeform text, when entered.
    pub freeform_text: Option<String>,
}

/// Judgment transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Backend could not be reached.
    #[error("judgment transport unavailable: {0}")]
    Unavailable(String),
    /// Backend refused the judgment.
    #[error("judgment rejected: {0}")]
    Rejected(String),
}

/// Transport that records judgments against the pipeline backend.
#[async_trait]
pub trait JudgmentTransport: Send + Sync {
    /// Submits a judgment.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the backend does not accept the judgment.
    async fn submit(&self, request: &JudgmentRequest) -> Result<(), TransportError>;
}
