// crates/judgment-gate-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Fake collaborators and stage builders for gate tests.
// Purpose: Provide deterministic directory, transport, and audit doubles.
// Dependencies: judgment-gate-core, tokio
// ============================================================================

//! ## Overview
//! Shared fixtures for gate tests. The fakes record every call so tests can
//! assert how often the transport was reached and which audit events fired.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use judgment_gate_core::ApplicationName;
use judgment_gate_core::DirectoryError;
use judgment_gate_core::ExecutionId;
use judgment_gate_core::GateAuditEvent;
use judgment_gate_core::GateAuditSink;
use judgment_gate_core::GateCollaborators;
use judgment_gate_core::GateLabels;
use judgment_gate_core::JudgmentGate;
use judgment_gate_core::JudgmentInputEntry;
use judgment_gate_core::JudgmentRequest;
use judgment_gate_core::JudgmentTransport;
use judgment_gate_core::OperatorRoles;
use judgment_gate_core::PermissionDirectory;
use judgment_gate_core::PermissionKind;
use judgment_gate_core::RoleGrantSet;
use judgment_gate_core::StageContext;
use judgment_gate_core::StageExecution;
use judgment_gate_core::StageId;
use judgment_gate_core::StageStatus;
use judgment_gate_core::StaticIdentity;
use judgment_gate_core::TransportError;
use tokio::sync::Notify;

// ============================================================================
// SECTION: Permission Directory
// ============================================================================

/// Canned permission directory answer.
#[derive(Clone)]
pub enum DirectoryReply {
    Grants(RoleGrantSet),
    Nothing,
    Fail,
}

pub struct FakeDirectory {
    reply: DirectoryReply,
    calls: AtomicUsize,
}

impl FakeDirectory {
    pub fn new(reply: DirectoryReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionDirectory for FakeDirectory {
    async fn application_permissions(
        &self,
        _application: &ApplicationName,
    ) -> Result<Option<RoleGrantSet>, DirectoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            DirectoryReply::Grants(grants) => Ok(Some(grants.clone())),
            DirectoryReply::Nothing => Ok(None),
            DirectoryReply::Fail => Err(DirectoryError::Unavailable("directory down".to_string())),
        }
    }
}

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Transport that records requests and answers after yielding once.
pub struct RecordingTransport {
    requests: Mutex<Vec<JudgmentRequest>>,
    fail: bool,
    release: Option<Notify>,
}

impl RecordingTransport {
    pub fn accepting() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail: false,
            release: None,
        }
    }

    pub fn rejecting() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail: true,
            release: None,
        }
    }

    /// Transport that holds every submission until [`Self::release`] is called.
    pub fn held() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail: false,
            release: Some(Notify::new()),
        }
    }

    pub fn release(&self) {
        if let Some(release) = &self.release {
            release.notify_one();
        }
    }

    pub fn requests(&self) -> Vec<JudgmentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl JudgmentTransport for RecordingTransport {
    async fn submit(&self, request: &JudgmentRequest) -> Result<(), TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.release {
            Some(release) => release.notified().await,
            None => tokio::task::yield_now().await,
        }
        if self.fail {
            return Err(TransportError::Rejected("backend said no".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

#[derive(Default)]
pub struct CollectingAuditSink {
    events: Mutex<Vec<GateAuditEvent>>,
}

impl CollectingAuditSink {
    pub fn events(&self) -> Vec<GateAuditEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Returns `(event, outcome)` pairs in emission order.
    pub fn outcomes(&self) -> Vec<(&'static str, &'static str)> {
        self.events().iter().map(|event| (event.event, event.outcome)).collect()
    }
}

impl GateAuditSink for CollectingAuditSink {
    fn record(&self, event: &GateAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Builders
// ============================================================================

pub fn entries(values: &[&str]) -> Vec<JudgmentInputEntry> {
    values.iter().copied().map(JudgmentInputEntry::from).collect()
}

pub fn stage_roles(roles: &[&str]) -> Vec<String> {
    roles.iter().map(ToString::to_string).collect()
}

pub fn running_stage(context: StageContext) -> StageExecution {
    StageExecution {
        id: StageId::new("stage-1"),
        name: "Manual Judgment".to_string(),
        status: StageStatus::Running,
        context,
    }
}

pub fn write_grants(role: &str) -> RoleGrantSet {
    RoleGrantSet::empty().with_grant(PermissionKind::Write, role)
}

/// Gate plus handles to its fakes.
pub struct Harness {
    pub gate: JudgmentGate,
    pub directory: Arc<FakeDirectory>,
    pub transport: Arc<RecordingTransport>,
    pub audit: Arc<CollectingAuditSink>,
}

pub fn harness(
    stage: StageExecution,
    reply: DirectoryReply,
    operator_roles: &[&str],
    transport: RecordingTransport,
) -> Harness {
    let directory = Arc::new(FakeDirectory::new(reply));
    let transport = Arc::new(transport);
    let audit = Arc::new(CollectingAuditSink::default());
    let collaborators = GateCollaborators {
        directory: directory.clone(),
        identity: Arc::new(StaticIdentity::new(OperatorRoles::new(
            operator_roles.iter().copied(),
        ))),
        transport: transport.clone(),
        audit: audit.clone(),
    };
    let gate = JudgmentGate::new(
        ApplicationName::new("checkout"),
        ExecutionId::new("exec-1"),
        stage,
        GateLabels::default(),
        collaborators,
    );
    Harness {
        gate,
        directory,
        transport,
        audit,
    }
}

/// Builds and attaches a gate for an unrestricted running stage.
pub async fn attached(
    context: StageContext,
    reply: DirectoryReply,
    operator_roles: &[&str],
    transport: RecordingTransport,
) -> Harness {
    let harness = harness(running_stage(context), reply, operator_roles, transport);
    harness.gate.attach().await;
    harness
}
