// crates/judgment-gate-cli/src/lib.rs
// ============================================================================
// Module: Judgment Gate CLI Library
// Description: HTTP adapters shared by the judgment-gate binary.
// Purpose: Expose the pipeline API client for the CLI and its tests.
// Dependencies: judgment-gate-core, judgment-gate-config, reqwest
// ============================================================================

//! ## Overview
//! Library half of the `judgment-gate` CLI. It hosts the pipeline API client
//! that backs the gate's permission directory and judgment transport.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod api;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use api::ApiError;
pub use api::ApiJudgmentTransport;
pub use api::GateApiClient;
pub use api::Operator;
