// crates/judgment-gate-core/src/runtime/audit.rs
// ============================================================================
// Module: Judgment Gate Audit Logging
// Description: Structured audit events for gate lifecycle and submissions.
// Purpose: Emit JSON-line audit records without a hard logging dependency.
// Dependencies: crate::core, serde, serde_json
// ============================================================================

//! ## Overview
//! Audit events record attachment, permission loading, and every judgment
//! invocation with its outcome. Sinks are pluggable so deployments can route
//! events to stderr, an append-only file, or nowhere.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::ApplicationName;
use crate::core::ExecutionId;
use crate::core::JudgmentDecision;
use crate::core::StageId;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Gate audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Owning application.
    pub application: ApplicationName,
    /// Execution identifier.
    pub execution_id: ExecutionId,
    /// Stage identifier.
    pub stage_id: StageId,
    /// Decision involved, when any.
    pub decision: Option<JudgmentDecision>,
    /// Outcome label.
    pub outcome: &'static str,
    /// Failure or refusal reason.
    pub reason: Option<String>,
}

/// Inputs required to construct a gate audit event.
pub struct GateAuditEventParams<'a> {
    /// Event identifier.
    pub event: &'static str,
    /// Owning application.
    pub application: &'a ApplicationName,
    /// Execution identifier.
    pub execution_id: &'a ExecutionId,
    /// Stage identifier.
    pub stage_id: &'a StageId,
    /// Decision involved, when any.
    pub decision: Option<JudgmentDecision>,
    /// Outcome label.
    pub outcome: &'static str,
    /// Failure or refusal reason.
    pub reason: Option<String>,
}

impl GateAuditEvent {
    /// Creates a new audit event stamped with the current time.
    #[must_use]
    pub fn new(params: GateAuditEventParams<'_>) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: params.event,
            timestamp_ms,
            application: params.application.clone(),
            execution_id: params.execution_id.clone(),
            stage_id: params.stage_id.clone(),
            decision: params.decision,
            outcome: params.outcome,
            reason: params.reason,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for gate events.
pub trait GateAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &GateAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl GateAuditSink for StderrAuditSink {
    fn record(&self, event: &GateAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl GateAuditSink for FileAuditSink {
    fn record(&self, event: &GateAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl GateAuditSink for NoopAuditSink {
    fn record(&self, _event: &GateAuditEvent) {}
}
