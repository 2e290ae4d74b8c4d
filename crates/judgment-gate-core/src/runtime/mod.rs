// crates/judgment-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Judgment Gate Runtime
// Description: Authorization, submission state machine, view model, and audit.
// Purpose: Drive manual judgment decisions against the collaborator interfaces.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the decision-gating logic: the authorization
//! predicate, the gate that owns submission state, the view snapshot hosts
//! render from, and the audit sinks the gate reports to.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod authorization;
pub mod gate;
pub mod view;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::GateAuditEvent;
pub use audit::GateAuditEventParams;
pub use audit::GateAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use authorization::AuthorizationDecision;
pub use authorization::AuthorizationEvaluator;
pub use authorization::is_authorized;
pub use gate::DEFAULT_SUBMISSION_ERROR;
pub use gate::GateCollaborators;
pub use gate::GateError;
pub use gate::GateLabels;
pub use gate::JudgmentGate;
pub use gate::SubmissionOutcome;
pub use view::ButtonView;
pub use view::DecisionBlocker;
pub use view::GateView;
pub use view::controls_visible;
