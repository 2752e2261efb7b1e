// crates/score-ledger-core/src/interfaces/mod.rs
// ============================================================================
// Module: Score Ledger Interfaces
// Description: Backend-agnostic store interface for score records.
// Purpose: Let the ledger run against in-memory or durable backends.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! [`ScoreStore`] is the only seam between the ledger and persistence. Every
//! method is one atomic unit: writes are durable before the call returns and
//! failures surface as [`StoreError`] rather than being dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::CodeKey;
use crate::core::ScoreEntry;
use crate::core::SubjectName;
use crate::core::Timestamp;

// ============================================================================
// SECTION: Store
// ============================================================================

/// Score store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages never embed raw national codes.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("score store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("score store corruption: {0}")]
    Corrupt(String),
    /// Store data version is incompatible.
    #[error("score store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("score store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("score store error: {0}")]
    Store(String),
}

/// Durable mapping from `(code_key, subject)` to the latest score.
pub trait ScoreStore: Send + Sync {
    /// Inserts or replaces the score for `(code_key, subject)`.
    ///
    /// Returns the stored `updated_at`, which is never earlier than the value
    /// it replaces.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn upsert(
        &self,
        code_key: &CodeKey,
        subject: &SubjectName,
        score: f64,
    ) -> Result<Timestamp, StoreError>;

    /// Removes one record. Returns true when a record existed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete fails.
    fn delete(&self, code_key: &CodeKey, subject: &SubjectName) -> Result<bool, StoreError>;

    /// Removes every record for `code_key` and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete fails.
    fn delete_all(&self, code_key: &CodeKey) -> Result<u64, StoreError>;

    /// Returns all entries for `code_key`, ordered by subject ascending.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn lookup(&self, code_key: &CodeKey) -> Result<Vec<ScoreEntry>, StoreError>;

    /// Returns the entry for `(code_key, subject)` when present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn lookup_one(
        &self,
        code_key: &CodeKey,
        subject: &SubjectName,
    ) -> Result<Option<ScoreEntry>, StoreError>;

    /// Returns up to `limit` distinct keys in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn list_keys(&self, limit: usize) -> Result<Vec<CodeKey>, StoreError>;

    /// Returns the total number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn count(&self) -> Result<u64, StoreError>;
}
