// crates/score-ledger-core/src/core/record.rs
// ============================================================================
// Module: Score Ledger Records
// Description: Score records, lookup entries, and score parsing rules.
// Purpose: Define the persisted shape of a score and how raw score text is read.
// Dependencies: crate::core::{hashing, identifiers, normalize, time}, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`ScoreRecord`] is the unit owned by the store: one per
//! `(code_key, subject)` pair. Lookups return [`ScoreEntry`] values, which
//! drop the key because the caller already holds it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::hashing::CodeKey;
use crate::core::identifiers::SubjectName;
use crate::core::normalize::normalize_digits;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Records
// ============================================================================

/// A stored score for one subject of one pseudonymized code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Pseudonymized identity.
    pub code_key: CodeKey,
    /// Normalized subject.
    pub subject: SubjectName,
    /// Latest score.
    pub score: f64,
    /// Time of the last write.
    pub updated_at: Timestamp,
}

/// A single lookup result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Normalized subject.
    pub subject: SubjectName,
    /// Latest score.
    pub score: f64,
    /// Time of the last write.
    pub updated_at: Timestamp,
}

impl From<ScoreRecord> for ScoreEntry {
    fn from(record: ScoreRecord) -> Self {
        Self {
            subject: record.subject,
            score: record.score,
            updated_at: record.updated_at,
        }
    }
}

// ============================================================================
// SECTION: Score Parsing
// ============================================================================

/// Errors raised when reading a score value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    /// Score text is not a finite number.
    #[error("score must be a finite number")]
    Unparsable,
    /// Score lies outside the configured bounds.
    #[error("score {score} is outside the allowed range")]
    OutOfRange {
        /// Parsed score.
        score: f64,
    },
}

/// Optional inclusive score bounds.
///
/// # Invariants
/// - When both ends are set, `min <= max`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBounds {
    /// Inclusive lower bound.
    #[serde(default)]
    pub min: Option<f64>,
    /// Inclusive upper bound.
    #[serde(default)]
    pub max: Option<f64>,
}

impl ScoreBounds {
    /// Bounds that accept any finite score.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// Returns true when `score` is within the bounds.
    #[must_use]
    pub fn contains(&self, score: f64) -> bool {
        self.min.is_none_or(|min| score >= min) && self.max.is_none_or(|max| score <= max)
    }
}

/// Parses raw score text after folding localized digits.
///
/// # Errors
///
/// Returns [`ScoreError::Unparsable`] for non-numeric or non-finite input.
pub fn parse_score(raw: &str) -> Result<f64, ScoreError> {
    let normalized = normalize_digits(raw.trim());
    let value: f64 = normalized.parse().map_err(|_| ScoreError::Unparsable)?;
    if value.is_finite() { Ok(value) } else { Err(ScoreError::Unparsable) }
}

/// Parses raw score text and checks it against `bounds`.
///
/// # Errors
///
/// Returns [`ScoreError`] when parsing or the bounds check fails.
pub fn parse_bounded_score(raw: &str, bounds: &ScoreBounds) -> Result<f64, ScoreError> {
    let score = parse_score(raw)?;
    if bounds.contains(score) {
        Ok(score)
    } else {
        Err(ScoreError::OutOfRange {
            score,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
