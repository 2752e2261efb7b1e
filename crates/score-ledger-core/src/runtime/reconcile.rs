// crates/score-ledger-core/src/runtime/reconcile.rs
// ============================================================================
// Module: Score Ledger Bulk Reconciler
// Description: Row-by-row application of candidate score rows.
// Purpose: Apply batches with per-row outcomes and no batch-level rollback.
// Dependencies: crate::core, crate::interfaces, serde
// ============================================================================

//! ## Overview
//! A batch is a sequence of [`CandidateRow`] values. Each row is validated and
//! applied on its own; a failing row becomes a rejection outcome and the next
//! row proceeds. The report always has exactly one [`RowOutcome`] per input
//! row, in input order.
//!
//! Per-row pipeline: shape check, digit folding, code validation, score
//! parsing, bounds check, pseudonymization, upsert.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;

use crate::core::NationalCode;
use crate::core::Pseudonymizer;
use crate::core::ScoreBounds;
use crate::core::ScoreError;
use crate::core::SubjectName;
use crate::core::normalize_digits;
use crate::core::parse_bounded_score;
use crate::core::tokenize_fields;
use crate::interfaces::ScoreStore;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Minimum number of non-empty fields in a row: code, subject, score.
pub const MIN_ROW_FIELDS: usize = 3;

// ============================================================================
// SECTION: Rows
// ============================================================================

/// One candidate row of a batch.
///
/// # Invariants
/// - `fields` holds only trimmed, non-empty values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRow {
    /// One-based position of the row in its source.
    pub line: usize,
    /// Non-empty fields in source order.
    pub fields: Vec<String>,
}

impl CandidateRow {
    /// Builds a row by splitting free text on the field separators.
    #[must_use]
    pub fn from_text(line: usize, text: &str) -> Self {
        Self {
            line,
            fields: tokenize_fields(text),
        }
    }

    /// Builds a row from pre-split fields, dropping blank values.
    #[must_use]
    pub fn from_fields<I, T>(line: usize, fields: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self {
            line,
            fields: fields
                .into_iter()
                .map(|field| field.as_ref().trim().to_string())
                .filter(|field| !field.is_empty())
                .collect(),
        }
    }
}

/// Splits multi-line text into candidate rows, skipping blank lines.
#[must_use]
pub fn rows_from_text(text: &str) -> Vec<CandidateRow> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| CandidateRow::from_text(index + 1, line))
        .collect()
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Reason a row or argument list has the wrong shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormatIssue {
    /// Fewer fields than the operation needs.
    TooFewFields {
        /// Fields required.
        expected: usize,
        /// Fields present.
        found: usize,
    },
    /// The subject is empty after normalization.
    MissingSubject,
}

impl fmt::Display for FormatIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewFields {
                expected,
                found,
            } => write!(f, "expected at least {expected} fields, found {found}"),
            Self::MissingSubject => f.write_str("subject is empty"),
        }
    }
}

/// Result of applying one candidate row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// Row was stored.
    Accepted {
        /// Validated code.
        code: NationalCode,
        /// Normalized subject.
        subject: SubjectName,
    },
    /// Code failed shape or checksum validation.
    RejectedInvalidCode {
        /// Digit-folded code text as submitted.
        code: String,
    },
    /// Row has the wrong shape.
    RejectedBadFormat {
        /// Shape problem.
        reason: FormatIssue,
    },
    /// Score is not a finite number.
    RejectedUnparsableScore {
        /// Validated code.
        code: NationalCode,
        /// Normalized subject.
        subject: SubjectName,
    },
    /// Score lies outside the configured bounds.
    RejectedScoreOutOfRange {
        /// Validated code.
        code: NationalCode,
        /// Normalized subject.
        subject: SubjectName,
        /// Parsed score.
        score: f64,
    },
    /// Store failed while writing this row.
    RejectedStorage {
        /// Validated code.
        code: NationalCode,
        /// Normalized subject.
        subject: SubjectName,
    },
}

impl RowOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Accepted {
                ..
            } => "accepted",
            Self::RejectedInvalidCode {
                ..
            } => "rejected_invalid_code",
            Self::RejectedBadFormat {
                ..
            } => "rejected_bad_format",
            Self::RejectedUnparsableScore {
                ..
            } => "rejected_unparsable_score",
            Self::RejectedScoreOutOfRange {
                ..
            } => "rejected_score_out_of_range",
            Self::RejectedStorage {
                ..
            } => "rejected_storage",
        }
    }

    /// Returns true when the row was stored.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Aggregate counts for a batch report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReconcileSummary {
    /// Rows processed.
    pub rows: usize,
    /// Rows stored.
    pub accepted: usize,
    /// Rows rejected.
    pub rejected: usize,
}

impl ReconcileSummary {
    /// Tallies a batch report.
    #[must_use]
    pub fn from_outcomes(outcomes: &[RowOutcome]) -> Self {
        let accepted = outcomes.iter().filter(|outcome| outcome.is_accepted()).count();
        Self {
            rows: outcomes.len(),
            accepted,
            rejected: outcomes.len() - accepted,
        }
    }
}

// ============================================================================
// SECTION: Reconciler
// ============================================================================

/// Applies candidate rows against a score store.
pub struct BulkReconciler<'a, S: ScoreStore + ?Sized> {
    /// Target store.
    store: &'a S,
    /// Code pseudonymizer.
    pseudonymizer: &'a Pseudonymizer,
    /// Accepted score range.
    bounds: ScoreBounds,
}

impl<'a, S: ScoreStore + ?Sized> BulkReconciler<'a, S> {
    /// Creates a reconciler over `store`.
    #[must_use]
    pub const fn new(store: &'a S, pseudonymizer: &'a Pseudonymizer, bounds: ScoreBounds) -> Self {
        Self {
            store,
            pseudonymizer,
            bounds,
        }
    }

    /// Applies every row in order and reports one outcome per row.
    #[must_use]
    pub fn reconcile(&self, rows: &[CandidateRow]) -> Vec<RowOutcome> {
        rows.iter().map(|row| self.apply_row(row)).collect()
    }

    /// Applies one row.
    #[must_use]
    pub fn apply_row(&self, row: &CandidateRow) -> RowOutcome {
        let [code_field, subject_fields @ .., score_field] = row.fields.as_slice() else {
            return too_few_fields(row.fields.len());
        };
        if subject_fields.is_empty() {
            return too_few_fields(row.fields.len());
        }
        let Ok(code) = NationalCode::parse(code_field) else {
            return RowOutcome::RejectedInvalidCode {
                code: normalize_digits(code_field.trim()),
            };
        };
        let Some(subject) = SubjectName::new(&subject_fields.join(" ")) else {
            return RowOutcome::RejectedBadFormat {
                reason: FormatIssue::MissingSubject,
            };
        };
        let score = match parse_bounded_score(score_field, &self.bounds) {
            Ok(score) => score,
            Err(ScoreError::Unparsable) => {
                return RowOutcome::RejectedUnparsableScore {
                    code,
                    subject,
                };
            }
            Err(ScoreError::OutOfRange {
                score,
            }) => {
                return RowOutcome::RejectedScoreOutOfRange {
                    code,
                    subject,
                    score,
                };
            }
        };
        let code_key = self.pseudonymizer.pseudonymize(&code);
        match self.store.upsert(&code_key, &subject, score) {
            Ok(_) => RowOutcome::Accepted {
                code,
                subject,
            },
            Err(_) => RowOutcome::RejectedStorage {
                code,
                subject,
            },
        }
    }
}

/// Builds the outcome for a row with too few fields.
const fn too_few_fields(found: usize) -> RowOutcome {
    RowOutcome::RejectedBadFormat {
        reason: FormatIssue::TooFewFields {
            expected: MIN_ROW_FIELDS,
            found,
        },
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::expect_used,
        clippy::unwrap_used,
        reason = "Test assertions use expect/unwrap for clarity."
    )]

    use super::CandidateRow;
    use super::rows_from_text;

    #[test]
    fn text_rows_skip_blank_lines_and_keep_positions() {
        let rows = rows_from_text("0012345679 math 18\n\n  \n0084571233|physics:17\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 1);
        assert_eq!(rows[1].line, 4);
        assert_eq!(rows[1].fields, vec!["0084571233", "physics", "17"]);
    }

    #[test]
    fn field_rows_drop_blank_values() {
        let row = CandidateRow::from_fields(2, [" 0012345679 ", "", " Linear Algebra ", "19"]);
        assert_eq!(row.fields, vec!["0012345679", "Linear Algebra", "19"]);
    }
}
