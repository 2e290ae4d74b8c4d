// crates/judgment-gate-core/src/runtime/view.rs
// ============================================================================
// Module: Judgment Gate View Model
// Description: Presentation data derived from gate state on every evaluation.
// Purpose: Expose what controls to show, enable, and mark busy.
// Dependencies: crate::core, crate::runtime::authorization, serde
// ============================================================================

//! ## Overview
//! A [`GateView`] is a pure snapshot: the gate builds a fresh one each time it
//! is asked, so authorization and input readiness always reflect the current
//! role sets and pending input. Rendering is left to the host.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;

use crate::core::JudgmentDecision;
use crate::core::StageExecution;
use crate::core::StageStatus;
use crate::runtime::authorization::AuthorizationDecision;

// ============================================================================
// SECTION: Blockers
// ============================================================================

/// First reason the decision controls are disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionBlocker {
    /// Stage status no longer offers decision controls.
    ControlsHidden,
    /// A decision is already in flight.
    Submitting,
    /// The stage already carries a persisted judgment.
    JudgmentRecorded,
    /// Operator may not judge this stage.
    Unauthorized,
    /// Options are offered and none is selected.
    OptionRequired,
    /// Freeform input is offered and left blank.
    FreeformRequired,
}

impl DecisionBlocker {
    /// Returns a stable label for the blocker.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ControlsHidden => "controls_hidden",
            Self::Submitting => "submitting",
            Self::JudgmentRecorded => "judgment_recorded",
            Self::Unauthorized => "unauthorized",
            Self::OptionRequired => "option_required",
            Self::FreeformRequired => "freeform_required",
        }
    }
}

impl fmt::Display for DecisionBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SECTION: View Types
// ============================================================================

/// Display state of one decision button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonView {
    /// Decision the button invokes.
    pub decision: JudgmentDecision,
    /// Button label.
    pub label: String,
    /// Whether the button accepts clicks.
    pub enabled: bool,
    /// Whether the busy indicator is shown.
    pub busy: bool,
}

/// Presentation snapshot of a judgment gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateView {
    /// Whether the gate is attached to its stage.
    pub attached: bool,
    /// Operator instructions.
    pub instructions: Option<String>,
    /// Whether decision controls are rendered at all.
    pub controls_visible: bool,
    /// Offered option values, in order.
    pub options: Vec<String>,
    /// Currently selected option.
    pub selected_option: Option<String>,
    /// Freeform prompt, when freeform input is offered.
    pub freeform_prompt: Option<String>,
    /// Current freeform text.
    pub freeform_text: Option<String>,
    /// Stop button.
    pub stop_button: ButtonView,
    /// Continue button.
    pub continue_button: ButtonView,
    /// First reason the buttons are disabled.
    pub blocker: Option<DecisionBlocker>,
    /// Stage authorization outcome.
    pub authorization: AuthorizationDecision,
    /// Inline error shown after a rejected submission.
    pub error_message: Option<String>,
}

// ============================================================================
// SECTION: Visibility
// ============================================================================

/// Returns true when decision controls should be rendered for `stage`.
///
/// Controls stay visible (disabled) after a judgment is persisted while the
/// stage is still running.
#[must_use]
pub fn controls_visible(stage: &StageExecution) -> bool {
    let status = stage.status;
    !matches!(status, StageStatus::Skipped | StageStatus::Succeeded)
        && (stage.context.judgment_status.is_none() || status == StageStatus::Running)
}
