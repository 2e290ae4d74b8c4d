// crates/judgment-gate-core/src/lib.rs
// ============================================================================
// Module: Judgment Gate Core Library
// Description: Public API surface for the manual judgment gate.
// Purpose: Expose core types, collaborator interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Judgment Gate core holds a pipeline stage until an authorized operator
//! chooses to continue or stop. It decides who may judge a stage, when the
//! decision controls are enabled, and tracks the single in-flight submission.
//! Pipeline backends plug in through the traits in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::DirectoryError;
pub use interfaces::IdentityProvider;
pub use interfaces::JudgmentRequest;
pub use interfaces::JudgmentTransport;
pub use interfaces::PermissionDirectory;
pub use interfaces::StaticIdentity;
pub use interfaces::TransportError;
pub use runtime::AuthorizationDecision;
pub use runtime::AuthorizationEvaluator;
pub use runtime::ButtonView;
pub use runtime::DEFAULT_SUBMISSION_ERROR;
pub use runtime::DecisionBlocker;
pub use runtime::FileAuditSink;
pub use runtime::GateAuditEvent;
pub use runtime::GateAuditEventParams;
pub use runtime::GateAuditSink;
pub use runtime::GateCollaborators;
pub use runtime::GateError;
pub use runtime::GateLabels;
pub use runtime::GateView;
pub use runtime::JudgmentGate;
pub use runtime::NoopAuditSink;
pub use runtime::StderrAuditSink;
pub use runtime::SubmissionOutcome;
pub use runtime::controls_visible;
pub use runtime::is_authorized;
