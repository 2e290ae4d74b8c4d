// crates/judgment-gate-core/src/core/state.rs
// ============================================================================
// Module: Judgment Gate Local State
// Description: Pending operator input and submission tracking records.
// Purpose: Hold the attachment-scoped state mutated by operator interaction.
// Dependencies: crate::core::stage, serde
// ============================================================================

//! ## Overview
//! These records live for one gate attachment and are discarded on detach.
//! Transitions are driven by [`crate::runtime::JudgmentGate`]; the types here
//! only describe the shape of the state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::stage::JudgmentDecision;

// ============================================================================
// SECTION: Pending Input
// ============================================================================

/// Operator's in-progress, unsubmitted answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInput {
    /// Selected option value.
    pub selected_option: Option<String>,
    /// Freeform text value.
    pub freeform_text: Option<String>,
}

impl PendingInput {
    /// Returns true when an option has been selected.
    #[must_use]
    pub fn has_option(&self) -> bool {
        self.selected_option.as_deref().is_some_and(|value| !value.is_empty())
    }

    /// Returns true when freeform text has been entered.
    #[must_use]
    pub fn has_freeform(&self) -> bool {
        self.freeform_text.as_deref().is_some_and(|value| !value.is_empty())
    }
}

// ============================================================================
// SECTION: Decision Status
// ============================================================================

/// Decision most recently invoked by the operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    /// No decision invoked yet.
    #[default]
    Unset,
    /// Continue was invoked.
    Continue,
    /// Stop was invoked.
    Stop,
}

impl DecisionStatus {
    /// Returns true when `decision` is the recorded one.
    #[must_use]
    pub fn is(self, decision: JudgmentDecision) -> bool {
        self == Self::from(decision)
    }
}

impl From<JudgmentDecision> for DecisionStatus {
    fn from(value: JudgmentDecision) -> Self {
        match value {
            JudgmentDecision::Continue => Self::Continue,
            JudgmentDecision::Stop => Self::Stop,
        }
    }
}

// ============================================================================
// SECTION: Submission State
// ============================================================================

/// Submission flags for the in-flight decision.
///
/// # Invariants
/// - `submitting` is set from invocation until the transport settles.
/// - `error` is set only by a rejected submission and cleared on retry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionState {
    /// A decision is in flight.
    pub submitting: bool,
    /// The last submission was rejected.
    pub error: bool,
}
