// crates/score-ledger-core/src/lib.rs
// ============================================================================
// Module: Score Ledger Core Library
// Description: Public API surface for the score ledger core.
// Purpose: Expose core types, the store interface, and runtime services.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Score ledger core resolves academic scores by national identity code
//! without persisting the raw code. It validates codes, pseudonymizes them
//! with a keyed HMAC, and applies single and bulk score operations against a
//! backend-agnostic [`ScoreStore`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::ScoreStore;
pub use interfaces::StoreError;
pub use runtime::AuditDecision;
pub use runtime::BulkReconciler;
pub use runtime::CandidateRow;
pub use runtime::DEFAULT_MAX_BATCH_ROWS;
pub use runtime::FormatIssue;
pub use runtime::InMemoryScoreStore;
pub use runtime::LIST_CODES_LIMIT;
pub use runtime::LedgerAuditEvent;
pub use runtime::LedgerAuditEventParams;
pub use runtime::LedgerAuditSink;
pub use runtime::LedgerError;
pub use runtime::LedgerFileAuditSink;
pub use runtime::LedgerNoopAuditSink;
pub use runtime::LedgerPolicy;
pub use runtime::LedgerStderrAuditSink;
pub use runtime::MIN_ROW_FIELDS;
pub use runtime::ReconcileSummary;
pub use runtime::RowOutcome;
pub use runtime::ScoreLedger;
pub use runtime::UpsertReceipt;
pub use runtime::rows_from_text;
