// crates/score-ledger-config/src/lib.rs
// ============================================================================
// Module: Score Ledger Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for score-ledger.toml semantics.
// Dependencies: score-ledger-core, score-ledger-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `score-ledger-config` defines the configuration model for the score
//! ledger. Loading is strict and fail-closed: an unusable secret, an invalid
//! admin entry, or inconsistent score bounds stop startup.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
