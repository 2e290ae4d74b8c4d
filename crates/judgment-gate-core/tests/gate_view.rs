// crates/judgment-gate-core/tests/gate_view.rs
// ============================================================================
// Module: Gate View Tests
// Description: Visibility, input gating, and label rules for the gate view.
// Purpose: Ensure every render reflects current stage and pending input.
// Dependencies: judgment-gate-core, tokio
// ============================================================================

//! ## Overview
//! Exercises the presentation snapshot: when controls show, what enables the
//! buttons, and which labels and prompts are displayed.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::use_debug,
    reason = "Test-only assertions use unwrap for clarity."
)]

mod common;

use common::DirectoryReply;
use common::RecordingTransport;
use common::attached;
use common::entries;
use common::running_stage;
use common::stage_roles;
use common::write_grants;
use judgment_gate_core::DecisionBlocker;
use judgment_gate_core::GateError;
use judgment_gate_core::JudgmentDecision;
use judgment_gate_core::StageContext;
use judgment_gate_core::StageStatus;
use judgment_gate_core::controls_visible;

// ============================================================================
// SECTION: Visibility
// ============================================================================

#[test]
fn controls_hidden_for_skipped_and_succeeded_stages() {
    for status in [StageStatus::Skipped, StageStatus::Succeeded] {
        let mut stage = running_stage(StageContext::default());
        stage.status = status;
        assert!(!controls_visible(&stage), "{status:?}");
    }
}

#[test]
fn persisted_judgment_keeps_controls_only_while_running() {
    let context = StageContext {
        judgment_status: Some(JudgmentDecision::Continue.into()),
        ..StageContext::default()
    };
    let mut stage = running_stage(context);
    assert!(controls_visible(&stage));

    stage.status = StageStatus::Paused;
    assert!(!controls_visible(&stage));
}

#[test]
fn controls_visible_for_unjudged_non_final_stages() {
    for status in [StageStatus::NotStarted, StageStatus::Paused, StageStatus::Terminal] {
        let mut stage = running_stage(StageContext::default());
        stage.status = status;
        assert!(controls_visible(&stage), "{status:?}");
    }
}

// ============================================================================
// SECTION: Input Gating
// ============================================================================

#[tokio::test]
async fn offered_options_require_a_selection() {
    let context = StageContext {
        judgment_inputs: entries(&["proceed", "rollback"]),
        ..StageContext::default()
    };
    let h = attached(context, DirectoryReply::Nothing, &[], RecordingTransport::accepting()).await;

    let view = h.gate.view();
    assert_eq!(view.options, vec!["proceed".to_string(), "rollback".to_string()]);
    assert_eq!(view.blocker, Some(DecisionBlocker::OptionRequired));
    assert!(!view.continue_button.enabled);

    h.gate.select_option("proceed").unwrap();
    let view = h.gate.view();
    assert_eq!(view.selected_option.as_deref(), Some("proceed"));
    assert!(view.continue_button.enabled);
    assert!(view.stop_button.enabled);
}

#[tokio::test]
async fn freeform_requires_non_empty_text() {
    let context = StageContext {
        judgment_freeform_inputs: entries(&["Reason for decision", "ignored"]),
        ..StageContext::default()
    };
    let h = attached(context, DirectoryReply::Nothing, &[], RecordingTransport::accepting()).await;

    let view = h.gate.view();
    assert_eq!(view.freeform_prompt.as_deref(), Some("Reason for decision"));
    assert_eq!(view.blocker, Some(DecisionBlocker::FreeformRequired));

    h.gate.set_freeform_text("").unwrap();
    assert_eq!(h.gate.view().blocker, Some(DecisionBlocker::FreeformRequired));

    h.gate.set_freeform_text(" ").unwrap();
    assert_eq!(h.gate.view().blocker, None);
}

#[tokio::test]
async fn input_readiness_does_not_override_authorization() {
    let context = StageContext {
        judgment_inputs: entries(&["proceed"]),
        selected_stage_roles: stage_roles(&["release-managers"]),
        ..StageContext::default()
    };
    let h = attached(
        context,
        DirectoryReply::Grants(write_grants("release-managers")),
        &["qa"],
        RecordingTransport::accepting(),
    )
    .await;
    h.gate.select_option("proceed").unwrap();

    let view = h.gate.view();
    assert!(!view.authorization.is_authorized());
    assert_eq!(view.blocker, Some(DecisionBlocker::Unauthorized));
    assert!(!view.continue_button.enabled);
}

#[tokio::test]
async fn unknown_option_is_rejected_without_changing_selection() {
    let context = StageContext {
        judgment_inputs: entries(&["proceed"]),
        ..StageContext::default()
    };
    let h = attached(context, DirectoryReply::Nothing, &[], RecordingTransport::accepting()).await;
    h.gate.select_option("proceed").unwrap();

    let err = h.gate.select_option("rollback").unwrap_err();

    assert_eq!(err, GateError::UnknownOption("rollback".to_string()));
    assert_eq!(h.gate.pending_input().selected_option.as_deref(), Some("proceed"));
}

// ============================================================================
// SECTION: Labels and Instructions
// ============================================================================

#[tokio::test]
async fn default_labels_apply_without_overrides() {
    let h = attached(
        StageContext::default(),
        DirectoryReply::Nothing,
        &[],
        RecordingTransport::accepting(),
    )
    .await;

    let view = h.gate.view();
    assert_eq!(view.stop_button.label, "Stop");
    assert_eq!(view.continue_button.label, "Continue");
    assert_eq!(view.instructions, None);
    assert_eq!(view.error_message, None);
}

#[tokio::test]
async fn stage_overrides_replace_labels_and_empty_overrides_fall_back() {
    let context = StageContext {
        instructions: Some("Check the **canary** dashboard.".to_string()),
        continue_button_label: Some("Ship it".to_string()),
        stop_button_label: Some(String::new()),
        ..StageContext::default()
    };
    let h = attached(context, DirectoryReply::Nothing, &[], RecordingTransport::accepting()).await;

    let view = h.gate.view();
    assert_eq!(view.continue_button.label, "Ship it");
    assert_eq!(view.stop_button.label, "Stop");
    assert_eq!(view.instructions.as_deref(), Some("Check the **canary** dashboard."));
}

#[tokio::test]
async fn empty_instructions_are_not_shown() {
    let context = StageContext {
        instructions: Some(String::new()),
        ..StageContext::default()
    };
    let h = attached(context, DirectoryReply::Nothing, &[], RecordingTransport::accepting()).await;

    assert_eq!(h.gate.view().instructions, None);
}

#[tokio::test]
async fn view_serializes_for_hosts() {
    let h = attached(
        StageContext::default(),
        DirectoryReply::Nothing,
        &[],
        RecordingTransport::accepting(),
    )
    .await;

    let value = serde_json::to_value(h.gate.view()).unwrap();

    assert_eq!(value["continue_button"]["decision"], "continue");
    assert_eq!(value["authorization"]["outcome"], "unrestricted");
    assert_eq!(value["blocker"], serde_json::Value::Null);
}
