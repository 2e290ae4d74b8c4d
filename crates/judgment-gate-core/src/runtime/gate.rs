// crates/judgment-gate-core/src/runtime/gate.rs
// ============================================================================
// Module: Judgment Gate Runtime
// Description: Submission state machine and input gating for manual judgments.
// Purpose: Own attachment-scoped state and drive the judgment transport.
// Dependencies: crate::{core, interfaces, runtime}, thiserror
// ============================================================================

//! ## Overview
//! A [`JudgmentGate`] is attached to one stage of one execution. Attaching
//! loads the operator role snapshot and the application role grants; each
//! load is merged on its own, so either may land first. Operator edits mutate
//! pending input, and invoking a decision moves the gate into submission
//! until the transport settles.
//!
//! State lives behind a mutex whose guard is never held across an `.await`.
//! Each attachment bumps a generation counter; results that settle after a
//! detach or re-attach are discarded without touching state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use serde::Serialize;
use thiserror::Error;

use crate::core::ApplicationName;
use crate::core::DEFAULT_CONTINUE_LABEL;
use crate::core::DEFAULT_STOP_LABEL;
use crate::core::DecisionStatus;
use crate::core::ExecutionId;
use crate::core::JudgmentDecision;
use crate::core::OperatorRoles;
use crate::core::PendingInput;
use crate::core::RoleGrantSet;
use crate::core::StageExecution;
use crate::core::StageId;
use crate::core::SubmissionState;
use crate::interfaces::IdentityProvider;
use crate::interfaces::JudgmentRequest;
use crate::interfaces::JudgmentTransport;
use crate::interfaces::PermissionDirectory;
use crate::interfaces::TransportError;
use crate::runtime::audit::GateAuditEvent;
use crate::runtime::audit::GateAuditEventParams;
use crate::runtime::audit::GateAuditSink;
use crate::runtime::authorization::AuthorizationDecision;
use crate::runtime::authorization::AuthorizationEvaluator;
use crate::runtime::view::ButtonView;
use crate::runtime::view::DecisionBlocker;
use crate::runtime::view::GateView;
use crate::runtime::view::controls_visible;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Inline message shown after a rejected submission.
pub const DEFAULT_SUBMISSION_ERROR: &str =
    "There was an error recording your decision. Please try again.";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Fallback labels used when the stage does not override them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateLabels {
    /// Stop button label.
    pub stop: String,
    /// Continue button label.
    pub continue_label: String,
    /// Inline message shown after a rejected submission.
    pub submission_error: String,
}

impl Default for GateLabels {
    fn default() -> Self {
        Self {
            stop: DEFAULT_STOP_LABEL.to_string(),
            continue_label: DEFAULT_CONTINUE_LABEL.to_string(),
            submission_error: DEFAULT_SUBMISSION_ERROR.to_string(),
        }
    }
}

/// External collaborators used by a gate.
#[derive(Clone)]
pub struct GateCollaborators {
    /// Source of application role grants.
    pub directory: Arc<dyn PermissionDirectory>,
    /// Source of the operator role snapshot.
    pub identity: Arc<dyn IdentityProvider>,
    /// Judgment submission transport.
    pub transport: Arc<dyn JudgmentTransport>,
    /// Audit sink for gate events.
    pub audit: Arc<dyn GateAuditSink>,
}

// ============================================================================
// SECTION: Errors and Outcomes
// ============================================================================

/// Gate refusals for operator actions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// Gate is not attached to its stage.
    #[error("gate is not attached")]
    Detached,
    /// Decision controls are disabled.
    #[error("decision blocked: {0}")]
    Blocked(DecisionBlocker),
    /// Selected value is not one of the offered options.
    #[error("option not offered by stage: {0}")]
    UnknownOption(String),
    /// Stage refresh targets a different stage.
    #[error("stage mismatch: expected {expected}, got {actual}")]
    StageMismatch {
        /// Stage the gate is attached to.
        expected: StageId,
        /// Stage carried by the refresh.
        actual: StageId,
    },
}

/// Result of a judgment that reached the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// Backend accepted the judgment; the stage refresh carries the result.
    Accepted,
    /// Backend rejected the judgment; the gate is idle with its error flag set.
    Failed {
        /// Transport failure reason.
        reason: String,
    },
    /// Transport settled after the gate was detached; nothing was applied.
    Discarded,
}

impl SubmissionOutcome {
    /// Returns a stable label for audit output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Failed {
                ..
            } => "failed",
            Self::Discarded => "discarded",
        }
    }
}

// ============================================================================
// SECTION: Gate State
// ============================================================================

/// Attachment-scoped gate state.
struct GateState {
    /// Latest stage snapshot.
    stage: StageExecution,
    /// Application role grants.
    grants: RoleGrantSet,
    /// Operator role snapshot.
    operator_roles: OperatorRoles,
    /// Pending operator input.
    pending: PendingInput,
    /// Submission flags.
    submission: SubmissionState,
    /// Decision most recently invoked.
    decision: DecisionStatus,
    /// Whether the gate is attached.
    attached: bool,
    /// Attachment generation.
    generation: u64,
}

impl GateState {
    /// Builds detached state for `stage`.
    fn new(stage: StageExecution) -> Self {
        Self {
            stage,
            grants: RoleGrantSet::empty(),
            operator_roles: OperatorRoles::default(),
            pending: PendingInput::default(),
            submission: SubmissionState::default(),
            decision: DecisionStatus::Unset,
            attached: false,
            generation: 0,
        }
    }

    /// Drops everything loaded or entered during an attachment.
    fn clear_attachment(&mut self) {
        self.grants = RoleGrantSet::empty();
        self.operator_roles = OperatorRoles::default();
        self.pending = PendingInput::default();
        self.submission = SubmissionState::default();
        self.decision = DecisionStatus::Unset;
    }

    /// Evaluates stage authorization from the current role sets.
    fn authorization(&self) -> AuthorizationDecision {
        AuthorizationEvaluator::evaluate(
            &self.stage.context.stage_roles(),
            &self.grants,
            &self.operator_roles,
        )
    }

    /// Returns the first reason decision controls are disabled.
    fn blocker(&self, authorization: &AuthorizationDecision) -> Option<DecisionBlocker> {
        let context = &self.stage.context;
        if !controls_visible(&self.stage) {
            Some(DecisionBlocker::ControlsHidden)
        } else if self.submission.submitting {
            Some(DecisionBlocker::Submitting)
        } else if context.judgment_status.is_some() {
            Some(DecisionBlocker::JudgmentRecorded)
        } else if !authorization.is_authorized() {
            Some(DecisionBlocker::Unauthorized)
        } else if context.requires_option() && !self.pending.has_option() {
            Some(DecisionBlocker::OptionRequired)
        } else if context.requires_freeform() && !self.pending.has_freeform() {
            Some(DecisionBlocker::FreeformRequired)
        } else {
            None
        }
    }

    /// Returns true when the busy indicator is lit for `decision`.
    fn is_busy(&self, decision: JudgmentDecision) -> bool {
        self.stage.context.recorded_decision() == Some(decision)
            || (self.submission.submitting && self.decision.is(decision))
    }
}

// ============================================================================
// SECTION: Judgment Gate
// ============================================================================

/// Manual judgment gate attached to one pipeline stage.
pub struct JudgmentGate {
    /// Owning application.
    application: ApplicationName,
    /// Execution identifier.
    execution_id: ExecutionId,
    /// Stage identifier.
    stage_id: StageId,
    /// Fallback labels.
    labels: GateLabels,
    /// External collaborators.
    collaborators: GateCollaborators,
    /// Mutable gate state.
    state: Mutex<GateState>,
}

impl JudgmentGate {
    /// Creates a detached gate for `stage`; call [`Self::attach`] before use.
    #[must_use]
    pub fn new(
        application: ApplicationName,
        execution_id: ExecutionId,
        stage: StageExecution,
        labels: GateLabels,
        collaborators: GateCollaborators,
    ) -> Self {
        Self {
            application,
            execution_id,
            stage_id: stage.id.clone(),
            labels,
            collaborators,
            state: Mutex::new(GateState::new(stage)),
        }
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Attaches the gate and loads operator roles and role grants.
    ///
    /// A failed or empty grants lookup leaves grants empty; it is never
    /// retried. Re-attaching discards all prior attachment state.
    pub async fn attach(&self) {
        let generation = {
            let mut state = self.lock();
            state.generation = state.generation.wrapping_add(1);
            state.attached = true;
            state.clear_attachment();
            state.generation
        };
        self.audit("gate_attached", None, "attached", None);

        let roles = self.collaborators.identity.operator_roles();
        self.merge(generation, |state| state.operator_roles = roles);

        let (grants, outcome, reason) =
            match self.collaborators.directory.application_permissions(&self.application).await {
                Ok(Some(grants)) if !grants.is_empty() => (grants, "loaded", None),
                Ok(Some(_) | None) => (RoleGrantSet::empty(), "empty", None),
                Err(err) => (RoleGrantSet::empty(), "failed", Some(err.to_string())),
            };
        if self.merge(generation, |state| state.grants = grants) {
            self.audit("permissions_load", None, outcome, reason);
        }
    }

    /// Detaches the gate, discarding pending input and submission state.
    pub fn detach(&self) {
        let was_attached = {
            let mut state = self.lock();
            let was_attached = state.attached;
            state.attached = false;
            state.clear_attachment();
            was_attached
        };
        if was_attached {
            self.audit("gate_detached", None, "detached", None);
        }
    }

    /// Returns true when the gate is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.lock().attached
    }

    /// Applies an externally refreshed stage snapshot.
    ///
    /// A persisted judgment ends the local submission; a complete stage
    /// status returns the gate to idle.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] when detached or when `stage` is a different stage.
    pub fn update_stage(&self, stage: StageExecution) -> Result<(), GateError> {
        if stage.id != self.stage_id {
            return Err(GateError::StageMismatch {
                expected: self.stage_id.clone(),
                actual: stage.id,
            });
        }
        let mut state = self.lock();
        if !state.attached {
            return Err(GateError::Detached);
        }
        if stage.context.judgment_status.is_some() {
            state.submission.submitting = false;
        }
        if stage.status.is_complete() {
            state.submission = SubmissionState::default();
            state.decision = DecisionStatus::Unset;
        }
        state.stage = stage;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    /// Selects one of the offered options.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] when detached or when `value` is not offered.
    pub fn select_option(&self, value: impl Into<String>) -> Result<(), GateError> {
        let value = value.into();
        let mut state = self.lock();
        if !state.attached {
            return Err(GateError::Detached);
        }
        if !state.stage.context.offers_option(&value) {
            return Err(GateError::UnknownOption(value));
        }
        state.pending.selected_option = Some(value);
        Ok(())
    }

    /// Replaces the freeform text.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Detached`] when the gate is not attached.
    pub fn set_freeform_text(&self, text: impl Into<String>) -> Result<(), GateError> {
        let mut state = self.lock();
        if !state.attached {
            return Err(GateError::Detached);
        }
        state.pending.freeform_text = Some(text.into());
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Decisions
    // ------------------------------------------------------------------------

    /// Invokes a decision and submits it through the transport.
    ///
    /// Refused invocations never reach the transport and leave state as is.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] when the gate is detached or controls are disabled.
    pub async fn decide(&self, decision: JudgmentDecision) -> Result<SubmissionOutcome, GateError> {
        let (generation, request) = match self.begin_submission(decision) {
            Ok(started) => started,
            Err(err) => {
                let reason = match &err {
                    GateError::Blocked(DecisionBlocker::Unauthorized) => {
                        format!("{err} ({})", self.authorization().label())
                    }
                    _ => err.to_string(),
                };
                self.audit("judgment_submit", Some(decision), "refused", Some(reason));
                return Err(err);
            }
        };
        let result = self.collaborators.transport.submit(&request).await;
        let outcome = self.finish_submission(generation, result);
        let reason = match &outcome {
            SubmissionOutcome::Failed {
                reason,
            } => Some(reason.clone()),
            SubmissionOutcome::Accepted | SubmissionOutcome::Discarded => None,
        };
        self.audit("judgment_submit", Some(decision), outcome.label(), reason);
        Ok(outcome)
    }

    /// Validates the gate and enters submission for `decision`.
    fn begin_submission(
        &self,
        decision: JudgmentDecision,
    ) -> Result<(u64, JudgmentRequest), GateError> {
        let mut state = self.lock();
        if !state.attached {
            return Err(GateError::Detached);
        }
        let authorization = state.authorization();
        if let Some(blocker) = state.blocker(&authorization) {
            return Err(GateError::Blocked(blocker));
        }
        state.submission = SubmissionState {
            submitting: true,
            error: false,
        };
        state.decision = decision.into();
        let request = JudgmentRequest {
            application: self.application.clone(),
            execution_id: self.execution_id.clone(),
            stage_id: self.stage_id.clone(),
            decision,
            selected_option: state.pending.selected_option.clone(),
            freeform_text: state.pending.freeform_text.clone(),
        };
        Ok((state.generation, request))
    }

    /// Applies the transport result when the attachment is still current.
    fn finish_submission(
        &self,
        generation: u64,
        result: Result<(), TransportError>,
    ) -> SubmissionOutcome {
        let mut state = self.lock();
        if !state.attached || state.generation != generation {
            return SubmissionOutcome::Discarded;
        }
        match result {
            Ok(()) => SubmissionOutcome::Accepted,
            Err(err) => {
                state.submission = SubmissionState {
                    submitting: false,
                    error: true,
                };
                state.decision = DecisionStatus::Unset;
                SubmissionOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    /// Builds a fresh presentation snapshot.
    #[must_use]
    pub fn view(&self) -> GateView {
        let state = self.lock();
        let authorization = state.authorization();
        let blocker = state.blocker(&authorization);
        let enabled = state.attached && blocker.is_none();
        let context = &state.stage.context;
        let button = |decision: JudgmentDecision, default_label: &str| ButtonView {
            decision,
            label: context.button_label(decision, default_label).to_string(),
            enabled,
            busy: state.is_busy(decision),
        };
        GateView {
            attached: state.attached,
            instructions: context.instructions.clone().filter(|text| !text.is_empty()),
            controls_visible: controls_visible(&state.stage),
            options: context.option_values(),
            selected_option: state.pending.selected_option.clone(),
            freeform_prompt: context.freeform_prompt().map(str::to_string),
            freeform_text: state.pending.freeform_text.clone(),
            stop_button: button(JudgmentDecision::Stop, &self.labels.stop),
            continue_button: button(JudgmentDecision::Continue, &self.labels.continue_label),
            blocker,
            error_message: state
                .submission
                .error
                .then(|| self.labels.submission_error.clone()),
            authorization,
        }
    }

    /// Returns the current authorization outcome.
    #[must_use]
    pub fn authorization(&self) -> AuthorizationDecision {
        self.lock().authorization()
    }

    /// Returns the current submission flags.
    #[must_use]
    pub fn submission_state(&self) -> SubmissionState {
        self.lock().submission
    }

    /// Returns the decision most recently invoked.
    #[must_use]
    pub fn decision_status(&self) -> DecisionStatus {
        self.lock().decision
    }

    /// Returns the pending operator input.
    #[must_use]
    pub fn pending_input(&self) -> PendingInput {
        self.lock().pending.clone()
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Locks gate state, recovering from a poisoned mutex.
    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `update` when `generation` is the current attachment.
    fn merge(&self, generation: u64, update: impl FnOnce(&mut GateState)) -> bool {
        let mut state = self.lock();
        if !state.attached || state.generation != generation {
            return false;
        }
        update(&mut state);
        true
    }

    /// Records an audit event for this gate.
    fn audit(
        &self,
        event: &'static str,
        decision: Option<JudgmentDecision>,
        outcome: &'static str,
        reason: Option<String>,
    ) {
        self.collaborators.audit.record(&GateAuditEvent::new(GateAuditEventParams {
            event,
            application: &self.application,
            execution_id: &self.execution_id,
            stage_id: &self.stage_id,
            decision,
            outcome,
            reason,
        }));
    }
}
