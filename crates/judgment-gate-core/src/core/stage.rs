// crates/judgment-gate-core/src/core/stage.rs
// ============================================================================
// Module: Judgment Gate Stage Model
// Description: Read-only view of the pipeline stage a gate is attached to.
// Purpose: Decode partially populated stage context with explicit defaults.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! The pipeline backend owns stage records; the gate only reads them. Every
//! context field is optional on the wire and decodes to an empty or absent
//! value, so accessors here define the defaults the gate relies on.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde_json::Value;

use crate::core::identifiers::ApplicationName;
use crate::core::identifiers::ExecutionId;
use crate::core::identifiers::StageId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Stop button label used when the stage does not override it.
pub const DEFAULT_STOP_LABEL: &str = "Stop";
/// Continue button label used when the stage does not override it.
pub const DEFAULT_CONTINUE_LABEL: &str = "Continue";

// ============================================================================
// SECTION: Decisions
// ============================================================================

/// Operator decision recorded against a manual judgment stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JudgmentDecision {
    /// Let the pipeline proceed.
    Continue,
    /// Halt the pipeline.
    Stop,
}

impl JudgmentDecision {
    /// Returns the wire label for the decision.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Continue => "continue",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for JudgmentDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Judgment status persisted on a stage by the backend.
///
/// Any non-empty value counts as recorded; values other than the two
/// decisions are kept verbatim so the gate still treats the stage as judged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JudgmentStatus {
    /// One of the known decisions.
    Decided(JudgmentDecision),
    /// A recorded value this gate does not recognize.
    Unrecognized(String),
}

impl JudgmentStatus {
    /// Returns the recorded decision when it is a known one.
    #[must_use]
    pub const fn decision(&self) -> Option<JudgmentDecision> {
        match self {
            Self::Decided(decision) => Some(*decision),
            Self::Unrecognized(_) => None,
        }
    }

    /// Returns the wire value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Decided(decision) => decision.as_str(),
            Self::Unrecognized(value) => value,
        }
    }
}

impl From<JudgmentDecision> for JudgmentStatus {
    fn from(decision: JudgmentDecision) -> Self {
        Self::Decided(decision)
    }
}

impl From<String> for JudgmentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "continue" => Self::Decided(JudgmentDecision::Continue),
            "stop" => Self::Decided(JudgmentDecision::Stop),
            _ => Self::Unrecognized(value),
        }
    }
}

impl Serialize for JudgmentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JudgmentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// Decodes a persisted judgment status; `null`, `false`, and `""` mean none.
fn persisted_status<'de, D>(deserializer: D) -> Result<Option<JudgmentStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let status = match Value::deserialize(deserializer)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(value) if value.is_empty() => None,
        Value::String(value) => Some(JudgmentStatus::from(value)),
        other => Some(JudgmentStatus::Unrecognized(other.to_string())),
    };
    Ok(status)
}

// ============================================================================
// SECTION: Stage Status
// ============================================================================

/// Execution status of a pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageStatus {
    /// Stage has not started.
    NotStarted,
    /// Stage is running.
    Running,
    /// Stage is paused.
    Paused,
    /// Stage is suspended.
    Suspended,
    /// Stage succeeded.
    Succeeded,
    /// Stage failed but the pipeline continued.
    FailedContinue,
    /// Stage failed terminally.
    Terminal,
    /// Stage was canceled.
    Canceled,
    /// Stage redirected execution.
    Redirect,
    /// Stage was stopped.
    Stopped,
    /// Stage is buffered behind another execution.
    Buffered,
    /// Stage was skipped.
    Skipped,
    /// Status not recognized by this build.
    #[serde(other)]
    Unknown,
}

impl StageStatus {
    /// Returns true when the stage has reached a final status.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(
            self,
            Self::Succeeded
                | Self::FailedContinue
                | Self::Terminal
                | Self::Canceled
                | Self::Stopped
                | Self::Skipped
        )
    }
}

// ============================================================================
// SECTION: Stage Context
// ============================================================================

/// Single entry of a judgment input list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgmentInputEntry {
    /// Option value or freeform prompt text.
    pub value: String,
}

impl From<&str> for JudgmentInputEntry {
    fn from(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }
}

/// Manual judgment fields of a stage context.
///
/// # Invariants
/// - Every field is optional; absent lists decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageContext {
    /// Operator instructions (markdown, passed through verbatim).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Selectable option values, in display order.
    #[serde(default, deserialize_with = "nullable_list")]
    pub judgment_inputs: Vec<JudgmentInputEntry>,
    /// Freeform inputs; only the first entry's value is used as a prompt.
    #[serde(default, deserialize_with = "nullable_list")]
    pub judgment_freeform_inputs: Vec<JudgmentInputEntry>,
    /// Persisted judgment once the backend has recorded one.
    #[serde(
        default,
        deserialize_with = "persisted_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub judgment_status: Option<JudgmentStatus>,
    /// Roles permitted to judge this stage; empty means unrestricted.
    #[serde(default, deserialize_with = "nullable_list")]
    pub selected_stage_roles: Vec<String>,
    /// Stop button label override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_button_label: Option<String>,
    /// Continue button label override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_button_label: Option<String>,
}

impl StageContext {
    /// Returns the persisted decision when it is a known one.
    #[must_use]
    pub fn recorded_decision(&self) -> Option<JudgmentDecision> {
        self.judgment_status.as_ref().and_then(JudgmentStatus::decision)
    }

    /// Returns the stage role allowlist as a set.
    #[must_use]
    pub fn stage_roles(&self) -> BTreeSet<String> {
        self.selected_stage_roles.iter().cloned().collect()
    }

    /// Returns the offered option values in order.
    #[must_use]
    pub fn option_values(&self) -> Vec<String> {
        self.judgment_inputs.iter().map(|entry| entry.value.clone()).collect()
    }

    /// Returns true when `value` is one of the offered options.
    #[must_use]
    pub fn offers_option(&self, value: &str) -> bool {
        self.judgment_inputs.iter().any(|entry| entry.value == value)
    }

    /// Returns true when an option selection is required.
    #[must_use]
    pub fn requires_option(&self) -> bool {
        !self.judgment_inputs.is_empty()
    }

    /// Returns true when freeform text is required.
    #[must_use]
    pub fn requires_freeform(&self) -> bool {
        !self.judgment_freeform_inputs.is_empty()
    }

    /// Returns the freeform prompt (first freeform entry).
    #[must_use]
    pub fn freeform_prompt(&self) -> Option<&str> {
        self.judgment_freeform_inputs.first().map(|entry| entry.value.as_str())
    }

    /// Returns the display label for a decision button.
    #[must_use]
    pub fn button_label<'a>(
        &'a self,
        decision: JudgmentDecision,
        default_label: &'a str,
    ) -> &'a str {
        let label = match decision {
            JudgmentDecision::Continue => self.continue_button_label.as_deref(),
            JudgmentDecision::Stop => self.stop_button_label.as_deref(),
        };
        label.filter(|value| !value.is_empty()).unwrap_or(default_label)
    }
}

/// Decodes a list that may be absent or `null`.
fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// SECTION: Executions
// ============================================================================

/// Stage record within a pipeline execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageExecution {
    /// Stage identifier.
    pub id: StageId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Current stage status.
    pub status: StageStatus,
    /// Stage context.
    #[serde(default)]
    pub context: StageContext,
}

/// Pipeline execution carrying its stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineExecution {
    /// Execution identifier.
    pub id: ExecutionId,
    /// Owning application.
    pub application: ApplicationName,
    /// Stage records.
    #[serde(default)]
    pub stages: Vec<StageExecution>,
}

impl PipelineExecution {
    /// Returns the stage with the given identifier.
    #[must_use]
    pub fn stage(&self, stage_id: &StageId) -> Option<&StageExecution> {
        self.stages.iter().find(|stage| &stage.id == stage_id)
    }
}
