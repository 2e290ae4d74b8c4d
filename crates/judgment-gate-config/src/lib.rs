// crates/judgment-gate-config/src/lib.rs
// ============================================================================
// Module: Judgment Gate Config Library
// Description: Configuration model and validation for the judgment gate.
// Purpose: Single source of truth for judgment-gate.toml semantics.
// Dependencies: judgment-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! `judgment-gate-config` defines the configuration model for the judgment
//! gate tooling: default button labels, the audit sink, and the pipeline API
//! client. Validation is strict and fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
