// crates/score-ledger-core/src/runtime/ledger.rs
// ============================================================================
// Module: Score Ledger Service
// Description: Operation boundary composing validation, access, and storage.
// Purpose: Expose the ledger operations with a single error taxonomy.
// Dependencies: crate::core, crate::interfaces, crate::runtime, thiserror
// ============================================================================

//! ## Overview
//! [`ScoreLedger`] is the only entry point outer surfaces use. Mutations are
//! authorized before any input is inspected, so an unauthorized caller learns
//! nothing about code validity and never reaches the store. Every operation
//! emits exactly one audit event carrying the code key, never the raw code.
//!
//! Security posture: callers are untrusted; raw codes are dropped after
//! pseudonymization.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::AccessDenied;
use crate::core::AccessGate;
use crate::core::CallerId;
use crate::core::CodeKey;
use crate::core::IdentityError;
use crate::core::NationalCode;
use crate::core::Pseudonymizer;
use crate::core::ScoreBounds;
use crate::core::ScoreEntry;
use crate::core::ScoreError;
use crate::core::SubjectName;
use crate::core::Timestamp;
use crate::core::parse_bounded_score;
use crate::interfaces::ScoreStore;
use crate::interfaces::StoreError;
use crate::runtime::audit::AuditDecision;
use crate::runtime::audit::LedgerAuditEvent;
use crate::runtime::audit::LedgerAuditEventParams;
use crate::runtime::audit::LedgerAuditSink;
use crate::runtime::audit::LedgerNoopAuditSink;
use crate::runtime::reconcile::BulkReconciler;
use crate::runtime::reconcile::CandidateRow;
use crate::runtime::reconcile::FormatIssue;
use crate::runtime::reconcile::ReconcileSummary;
use crate::runtime::reconcile::RowOutcome;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum number of code keys returned by a listing.
pub const LIST_CODES_LIMIT: usize = 200;
/// Default maximum number of rows accepted in one batch.
pub const DEFAULT_MAX_BATCH_ROWS: usize = 5_000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Ledger operation errors.
///
/// # Invariants
/// - Messages never embed raw national codes.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Code is malformed or fails the checksum.
    #[error("invalid national code: {0}")]
    Validation(IdentityError),
    /// Arguments have the wrong count or shape.
    #[error("malformed arguments: {0}")]
    Format(FormatIssue),
    /// Score text is not a finite number.
    #[error("score must be a finite number")]
    Parse,
    /// Score is outside the configured bounds.
    #[error("score {score} is outside the allowed range")]
    OutOfRange {
        /// Parsed score.
        score: f64,
    },
    /// Durable store failure.
    #[error(transparent)]
    Storage(#[from] StoreError),
    /// Caller is not privileged for the operation.
    #[error(transparent)]
    Authorization(#[from] AccessDenied),
    /// Batch exceeds the configured row limit.
    #[error("batch has {rows} rows (max {max})")]
    BatchTooLarge {
        /// Rows submitted.
        rows: usize,
        /// Configured limit.
        max: usize,
    },
}

impl LedgerError {
    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Format(_) => "format",
            Self::Parse => "parse",
            Self::OutOfRange {
                ..
            } => "out_of_range",
            Self::Storage(_) => "storage",
            Self::Authorization(_) => "unauthorized",
            Self::BatchTooLarge {
                ..
            } => "batch_too_large",
        }
    }
}

impl From<IdentityError> for LedgerError {
    fn from(error: IdentityError) -> Self {
        Self::Validation(error)
    }
}

impl From<ScoreError> for LedgerError {
    fn from(error: ScoreError) -> Self {
        match error {
            ScoreError::Unparsable => Self::Parse,
            ScoreError::OutOfRange {
                score,
            } => Self::OutOfRange {
                score,
            },
        }
    }
}

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Immutable operating limits for a ledger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerPolicy {
    /// Accepted score range.
    pub bounds: ScoreBounds,
    /// Maximum rows per batch.
    pub max_batch_rows: usize,
    /// Maximum keys returned by a listing.
    pub list_limit: usize,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            bounds: ScoreBounds::unbounded(),
            max_batch_rows: DEFAULT_MAX_BATCH_ROWS,
            list_limit: LIST_CODES_LIMIT,
        }
    }
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// Confirmation of a stored score.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertReceipt {
    /// Validated code.
    pub code: NationalCode,
    /// Normalized subject.
    pub subject: SubjectName,
    /// Stored score.
    pub score: f64,
    /// Stored write time.
    pub updated_at: Timestamp,
}

// ============================================================================
// SECTION: Ledger
// ============================================================================

/// Score ledger service.
pub struct ScoreLedger<S: ScoreStore> {
    /// Backing store.
    store: S,
    /// Code pseudonymizer.
    pseudonymizer: Pseudonymizer,
    /// Caller privilege gate.
    gate: AccessGate,
    /// Operating limits.
    policy: LedgerPolicy,
    /// Audit sink.
    audit: Arc<dyn LedgerAuditSink>,
}

impl<S: ScoreStore> ScoreLedger<S> {
    /// Creates a ledger with a no-op audit sink.
    #[must_use]
    pub fn new(
        store: S,
        pseudonymizer: Pseudonymizer,
        gate: AccessGate,
        policy: LedgerPolicy,
    ) -> Self {
        Self {
            store,
            pseudonymizer,
            gate,
            policy,
            audit: Arc::new(LedgerNoopAuditSink),
        }
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn LedgerAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the operating limits.
    #[must_use]
    pub const fn policy(&self) -> &LedgerPolicy {
        &self.policy
    }

    /// Returns true when `caller` may mutate scores.
    #[must_use]
    pub fn is_privileged(&self, caller: &CallerId) -> bool {
        self.gate.is_privileged(caller)
    }

    /// Checks the gate for `operation` ahead of argument parsing.
    ///
    /// Surfaces that inspect argument shape before calling an operation use
    /// this so unprivileged callers get a denial instead of usage hints.
    /// Only denials are audited; the operation itself audits the rest.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Authorization`] for non-privileged callers.
    pub fn authorize(&self, caller: &CallerId, operation: &'static str) -> Result<(), LedgerError> {
        let result = self.gate.require_privileged(caller, operation).map_err(LedgerError::from);
        if result.is_err() {
            self.record(audit_params(operation, Some(caller)), &result);
        }
        result
    }

    /// Inserts or replaces one score.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Authorization`] for non-privileged callers, and
    /// validation, parse, range, or storage errors for bad input or store
    /// failures.
    pub fn upsert_score(
        &self,
        caller: &CallerId,
        code: &str,
        subject: &str,
        score: &str,
    ) -> Result<UpsertReceipt, LedgerError> {
        let mut params = audit_params("upsert", Some(caller));
        let result = self.gate.require_privileged(caller, "upsert").map_err(LedgerError::from).and_then(
            |()| {
                let code = NationalCode::parse(code)?;
                let subject = require_subject(subject)?;
                let score = parse_bounded_score(score, &self.policy.bounds)?;
                let code_key = self.pseudonymizer.pseudonymize(&code);
                params.code_key = Some(code_key.clone());
                let updated_at = self.store.upsert(&code_key, &subject, score)?;
                Ok(UpsertReceipt {
                    code,
                    subject,
                    score,
                    updated_at,
                })
            },
        );
        self.record(params, &result);
        result
    }

    /// Removes one score. Returns true when a record existed.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] on authorization, validation, or store failure.
    pub fn remove_score(
        &self,
        caller: &CallerId,
        code: &str,
        subject: &str,
    ) -> Result<bool, LedgerError> {
        let mut params = audit_params("remove", Some(caller));
        let result = self.gate.require_privileged(caller, "remove").map_err(LedgerError::from).and_then(
            |()| {
                let code_key = self.code_key(code)?;
                let subject = require_subject(subject)?;
                params.code_key = Some(code_key.clone());
                Ok(self.store.delete(&code_key, &subject)?)
            },
        );
        self.record(params, &result);
        result
    }

    /// Removes every score for a code and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] on authorization, validation, or store failure.
    pub fn remove_all_scores(&self, caller: &CallerId, code: &str) -> Result<u64, LedgerError> {
        let mut params = audit_params("remove_all", Some(caller));
        let result =
            self.gate.require_privileged(caller, "remove_all").map_err(LedgerError::from).and_then(
                |()| {
                    let code_key = self.code_key(code)?;
                    params.code_key = Some(code_key.clone());
                    Ok(self.store.delete_all(&code_key)?)
                },
            );
        self.record(params, &result);
        result
    }

    /// Lists stored code keys, capped by the policy list limit.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] on authorization or store failure.
    pub fn list_code_keys(&self, caller: &CallerId) -> Result<Vec<CodeKey>, LedgerError> {
        let mut params = audit_params("list_codes", Some(caller));
        let result =
            self.gate.require_privileged(caller, "list_codes").map_err(LedgerError::from).and_then(
                |()| Ok(self.store.list_keys(self.policy.list_limit)?),
            );
        if let Ok(keys) = &result {
            params.rows = Some(keys.len());
        }
        self.record(params, &result);
        result
    }

    /// Applies a batch of candidate rows and reports one outcome per row.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Authorization`] for non-privileged callers and
    /// [`LedgerError::BatchTooLarge`] when the batch exceeds the row limit.
    /// Row-level failures are reported as outcomes, not errors.
    pub fn bulk_upsert(
        &self,
        caller: &CallerId,
        rows: &[CandidateRow],
    ) -> Result<Vec<RowOutcome>, LedgerError> {
        let mut params = audit_params("bulk_upsert", Some(caller));
        params.rows = Some(rows.len());
        let result = self
            .gate
            .require_privileged(caller, "bulk_upsert")
            .map_err(LedgerError::from)
            .and_then(|()| self.check_batch_size(rows.len()))
            .map(|()| self.reconciler().reconcile(rows));
        if let Ok(outcomes) = &result {
            params.accepted = Some(ReconcileSummary::from_outcomes(outcomes).accepted);
        }
        self.record(params, &result);
        result
    }

    /// Returns every score stored for a code, ordered by subject.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] on validation or store failure.
    pub fn lookup_scores(
        &self,
        caller: &CallerId,
        code: &str,
    ) -> Result<Vec<ScoreEntry>, LedgerError> {
        let mut params = audit_params("lookup", Some(caller));
        let result = self.code_key(code).and_then(|code_key| {
            params.code_key = Some(code_key.clone());
            Ok(self.store.lookup(&code_key)?)
        });
        if let Ok(entries) = &result {
            params.rows = Some(entries.len());
        }
        self.record(params, &result);
        result
    }

    /// Returns the score stored for one subject of a code.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] on validation or store failure.
    pub fn lookup_subject(
        &self,
        caller: &CallerId,
        code: &str,
        subject: &str,
    ) -> Result<Option<ScoreEntry>, LedgerError> {
        let mut params = audit_params("lookup_subject", Some(caller));
        let result = self.code_key(code).and_then(|code_key| {
            let subject = require_subject(subject)?;
            params.code_key = Some(code_key.clone());
            Ok(self.store.lookup_one(&code_key, &subject)?)
        });
        self.record(params, &result);
        result
    }

    /// Applies sample rows when the store is empty.
    ///
    /// Returns `None` when the store already holds records.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the store cannot be read or the batch is
    /// too large.
    pub fn seed_if_empty(
        &self,
        rows: &[CandidateRow],
    ) -> Result<Option<Vec<RowOutcome>>, LedgerError> {
        let mut params = audit_params("seed", None);
        params.rows = Some(rows.len());
        let result = self.store.count().map_err(LedgerError::from).and_then(|count| {
            if count > 0 {
                return Ok(None);
            }
            self.check_batch_size(rows.len())?;
            Ok(Some(self.reconciler().reconcile(rows)))
        });
        if let Ok(Some(outcomes)) = &result {
            params.accepted = Some(ReconcileSummary::from_outcomes(outcomes).accepted);
        }
        self.record(params, &result);
        result
    }

    /// Returns a reconciler bound to this ledger's store and policy.
    fn reconciler(&self) -> BulkReconciler<'_, S> {
        BulkReconciler::new(&self.store, &self.pseudonymizer, self.policy.bounds)
    }

    /// Validates and pseudonymizes a raw code.
    fn code_key(&self, code: &str) -> Result<CodeKey, LedgerError> {
        let code = NationalCode::parse(code)?;
        Ok(self.pseudonymizer.pseudonymize(&code))
    }

    /// Enforces the batch row limit.
    fn check_batch_size(&self, rows: usize) -> Result<(), LedgerError> {
        if rows > self.policy.max_batch_rows {
            return Err(LedgerError::BatchTooLarge {
                rows,
                max: self.policy.max_batch_rows,
            });
        }
        Ok(())
    }

    /// Finalizes and emits the audit event for an operation.
    fn record<T>(&self, mut params: LedgerAuditEventParams, result: &Result<T, LedgerError>) {
        if let Err(err) = result {
            params.outcome = err.kind();
            if matches!(err, LedgerError::Authorization(_)) {
                params.decision = AuditDecision::Deny;
            }
        }
        self.audit.record(&LedgerAuditEvent::new(params));
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Starts audit parameters for an allowed, successful operation.
fn audit_params(operation: &'static str, caller: Option<&CallerId>) -> LedgerAuditEventParams {
    LedgerAuditEventParams {
        operation,
        caller_id: caller.cloned(),
        decision: AuditDecision::Allow,
        outcome: "ok",
        code_key: None,
        rows: None,
        accepted: None,
    }
}

/// Normalizes a subject argument, rejecting empty values.
fn require_subject(raw: &str) -> Result<SubjectName, LedgerError> {
    SubjectName::new(raw).ok_or(LedgerError::Format(FormatIssue::MissingSubject))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
