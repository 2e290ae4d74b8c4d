// crates/judgment-gate-core/src/core/mod.rs
// ============================================================================
// Module: Judgment Gate Core Types
// Description: Identifiers, role grants, stage records, and local state.
// Purpose: Provide stable, serializable types shared by the gate runtime.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Core types describe what the gate reads (stage records, role grants,
//! operator roles) and what it owns (pending input, submission flags). They
//! carry no behavior beyond defaults and simple accessors.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod identifiers;
pub mod roles;
pub mod stage;
pub mod state;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use identifiers::ApplicationName;
pub use identifiers::ExecutionId;
pub use identifiers::StageId;
pub use roles::OperatorRoles;
pub use roles::PermissionKind;
pub use roles::RoleGrantSet;
pub use stage::DEFAULT_CONTINUE_LABEL;
pub use stage::DEFAULT_STOP_LABEL;
pub use stage::JudgmentDecision;
pub use stage::JudgmentInputEntry;
pub use stage::JudgmentStatus;
pub use stage::PipelineExecution;
pub use stage::StageContext;
pub use stage::StageExecution;
pub use stage::StageStatus;
pub use state::DecisionStatus;
pub use state::PendingInput;
pub use state::SubmissionState;
