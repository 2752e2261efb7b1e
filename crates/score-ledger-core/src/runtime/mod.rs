// crates/score-ledger-core/src/runtime/mod.rs
// ============================================================================
// Module: Score Ledger Runtime
// Description: Ledger service, bulk reconciler, audit sinks, and test store.
// Purpose: Execute ledger operations against any score store.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the ledger operations. Every outer surface calls
//! into [`ScoreLedger`] so authorization, validation, and audit behave the
//! same regardless of how a request arrives.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod ledger;
pub mod reconcile;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditDecision;
pub use audit::LedgerAuditEvent;
pub use audit::LedgerAuditEventParams;
pub use audit::LedgerAuditSink;
pub use audit::LedgerFileAuditSink;
pub use audit::LedgerNoopAuditSink;
pub use audit::LedgerStderrAuditSink;
pub use ledger::DEFAULT_MAX_BATCH_ROWS;
pub use ledger::LIST_CODES_LIMIT;
pub use ledger::LedgerError;
pub use ledger::LedgerPolicy;
pub use ledger::ScoreLedger;
pub use ledger::UpsertReceipt;
pub use reconcile::BulkReconciler;
pub use reconcile::CandidateRow;
pub use reconcile::FormatIssue;
pub use reconcile::MIN_ROW_FIELDS;
pub use reconcile::ReconcileSummary;
pub use reconcile::RowOutcome;
pub use reconcile::rows_from_text;
pub use store::InMemoryScoreStore;
