// crates/score-ledger-core/src/core/identity.rs
// ============================================================================
// Module: Score Ledger National Code Validation
// Description: Checksum validation for 10-digit national identity codes.
// Purpose: Admit only well-formed codes into pseudonymization and storage.
// Dependencies: crate::core::normalize, thiserror
// ============================================================================

//! ## Overview
//! A [`NationalCode`] can only be built by [`NationalCode::parse`], which
//! normalizes localized digits, checks the 10-digit shape, rejects the
//! repeated-digit sentinel class, and verifies the mod-11 check digit.
//!
//! Security posture: error messages never echo the raw code.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::normalize::normalize_digits;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Number of digits in a national code.
pub const NATIONAL_CODE_LEN: usize = 10;
/// Modulus of the check-digit scheme.
const CHECKSUM_MODULUS: u32 = 11;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Reasons a national code is rejected.
///
/// # Invariants
/// - Messages never contain the rejected input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Input is not exactly ten ASCII digits after normalization.
    #[error("national code must be exactly 10 digits")]
    Shape,
    /// All ten digits are identical.
    #[error("national code uses a repeated-digit sentinel")]
    RepeatedDigits,
    /// Check digit does not match.
    #[error("national code checksum mismatch")]
    Checksum,
}

// ============================================================================
// SECTION: National Code
// ============================================================================

/// A checksum-validated national code in ASCII-digit form.
///
/// # Invariants
/// - Exactly [`NATIONAL_CODE_LEN`] ASCII digits.
/// - Not all digits identical; check digit verified.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NationalCode(String);

impl NationalCode {
    /// Normalizes and validates a raw code.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] when the code fails shape or checksum checks.
    pub fn parse(raw: &str) -> Result<Self, IdentityError> {
        let normalized = normalize_digits(raw.trim());
        let digits = ascii_digits(&normalized).ok_or(IdentityError::Shape)?;
        if digits.iter().all(|digit| *digit == digits[0]) {
            return Err(IdentityError::RepeatedDigits);
        }
        if !checksum_matches(&digits) {
            return Err(IdentityError::Checksum);
        }
        Ok(Self(normalized))
    }

    /// Returns the ASCII digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for NationalCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NationalCode(<redacted>)")
    }
}

/// Returns true when `raw` is a valid national code.
#[must_use]
pub fn validate_national_code(raw: &str) -> bool {
    NationalCode::parse(raw).is_ok()
}

/// Returns true when `raw` has the 10-digit shape, regardless of checksum.
///
/// Plain-message routing uses this to tell "not a code" from "bad code".
#[must_use]
pub fn has_code_shape(raw: &str) -> bool {
    ascii_digits(&normalize_digits(raw.trim())).is_some()
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses exactly ten ASCII digits.
fn ascii_digits(text: &str) -> Option<[u32; NATIONAL_CODE_LEN]> {
    if text.len() != NATIONAL_CODE_LEN {
        return None;
    }
    let mut digits = [0u32; NATIONAL_CODE_LEN];
    for (slot, byte) in digits.iter_mut().zip(text.bytes()) {
        if !byte.is_ascii_digit() {
            return None;
        }
        *slot = u32::from(byte - b'0');
    }
    Some(digits)
}

/// Verifies the weighted mod-11 check digit.
fn checksum_matches(digits: &[u32; NATIONAL_CODE_LEN]) -> bool {
    let weighted: u32 = digits[.. NATIONAL_CODE_LEN - 1]
        .iter()
        .zip((2 ..= 10).rev())
        .map(|(digit, weight)| digit * weight)
        .sum();
    let remainder = weighted % CHECKSUM_MODULUS;
    let check = digits[NATIONAL_CODE_LEN - 1];
    if remainder < 2 { check == remainder } else { check == CHECKSUM_MODULUS - remainder }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
