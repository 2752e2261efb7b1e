// crates/score-ledger-cli/src/lib.rs
// ============================================================================
// Module: Score Ledger CLI Library
// Description: Shared helpers for the Score Ledger command-line interface.
// Purpose: Provide message routing, CSV import, and i18n for the binary and tests.
// Dependencies: score-ledger-core, score-ledger-config, thiserror
// ============================================================================

//! ## Overview
//! This library houses the pieces of the `score-ledger` binary that are worth
//! testing on their own: the localized message catalog, chat-style command
//! parsing, the ledger session that turns operations into reply lines, and
//! the tabular import reader. The binary entry point (`src/main.rs`) wires
//! them to configuration and the SQLite store.
//!
//! Security posture: message text and import files are untrusted; raw codes
//! only ever reach the caller's own reply.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Chat-style command parsing.
pub mod command;
/// Internationalization helpers and message catalog.
pub mod i18n;
/// Ledger operations rendered as localized replies.
pub mod session;
/// CSV/TSV import reader and column schema.
pub mod tabular;

#[cfg(test)]
mod tests;
