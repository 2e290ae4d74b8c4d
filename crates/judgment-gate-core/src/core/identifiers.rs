// crates/judgment-gate-core/src/core/identifiers.rs
// ============================================================================
// Module: Judgment Gate Identifiers
// Description: Opaque identifiers for applications, executions, and stages.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers are opaque strings assigned by the pipeline backend. They are
//! never parsed or validated here; the gate only carries them through to the
//! permission directory, the judgment transport, and audit events.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Application name owning a pipeline execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationName(String);

impl ApplicationName {
    /// Creates a new application name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ApplicationName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ApplicationName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Pipeline execution identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionId(String);

impl ExecutionId {
    /// Creates a new execution identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ExecutionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ExecutionId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Stage identifier within a pipeline execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(String);

impl StageId {
    /// Creates a new stage identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for StageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StageId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
