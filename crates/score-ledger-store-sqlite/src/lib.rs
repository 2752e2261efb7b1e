// crates/score-ledger-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Score Store
// Description: Durable ScoreStore backend using SQLite.
// Purpose: Provide local persistence for pseudonymized score records.
// Dependencies: score-ledger-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`ScoreStore`] implementation holding
//! one row per `(code_key, subject)` pair. Raw national codes never reach the
//! database. Security posture: database contents are untrusted and every row
//! is re-validated on read.
//!
//! [`ScoreStore`]: score_ledger_core::ScoreStore

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SCHEMA_VERSION;
pub use store::SqliteScoreStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
