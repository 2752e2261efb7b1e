// crates/score-ledger-core/src/core/identifiers.rs
// ============================================================================
// Module: Score Ledger Identifiers
// Description: Caller identities and normalized subject names.
// Purpose: Provide strongly typed identifiers with stable wire forms.
// Dependencies: crate::core::normalize, serde
// ============================================================================

//! ## Overview
//! Identifiers are opaque strings. [`SubjectName`] is always stored in its
//! folded form so two spellings that differ only in case or spacing name the
//! same subject.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::normalize::normalize_subject;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Identity of the caller issuing a request (for example a chat user id).
///
/// # Invariants
/// - Opaque UTF-8 string; surrounding whitespace is trimmed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerId(String);

impl CallerId {
    /// Creates a caller identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized subject name.
///
/// # Invariants
/// - Non-empty, lowercase, trimmed, single-spaced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectName(String);

impl SubjectName {
    /// Folds a raw subject name; returns `None` when nothing remains.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let folded = normalize_subject(raw);
        (!folded.is_empty()).then_some(Self(folded))
    }

    /// Returns the subject as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
