// crates/score-ledger-core/src/core/hashing.rs
// ============================================================================
// Module: Score Ledger Code Pseudonymization
// Description: Keyed one-way transform of validated national codes.
// Purpose: Derive opaque storage keys so raw codes are never persisted.
// Dependencies: crate::core::identity, hmac, serde, sha2, thiserror
// ============================================================================

//! ## Overview
//! Storage keys are HMAC-SHA256 digests of the validated code under a
//! process-wide secret, encoded as lowercase hex. The same code and secret
//! always yield the same [`CodeKey`]; rotating the secret orphans every
//! existing key.
//!
//! Security posture: the secret never appears in `Debug` output and keys are
//! never reversed inside the system.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use hmac::Hmac;
use hmac::Mac;
use serde::Deserialize;
use serde::Serialize;
use sha2::Sha256;
use thiserror::Error;

use crate::core::identity::NationalCode;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// HMAC-SHA256 keyed hash.
type HmacSha256 = Hmac<Sha256>;

/// Length of a hex-encoded code key.
pub const CODE_KEY_HEX_LEN: usize = 64;
/// Minimum accepted secret length in bytes.
pub const MIN_SECRET_BYTES: usize = 16;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when preparing the pseudonymizer.
#[derive(Debug, Error)]
pub enum PseudonymError {
    /// Secret is shorter than [`MIN_SECRET_BYTES`].
    #[error("pseudonymization secret must be at least {MIN_SECRET_BYTES} bytes")]
    SecretTooShort,
    /// The HMAC key could not be initialized.
    #[error("pseudonymization key rejected: {0}")]
    Key(String),
}

// ============================================================================
// SECTION: Secret
// ============================================================================

/// Process-wide pseudonymization secret.
///
/// # Invariants
/// - At least [`MIN_SECRET_BYTES`] bytes.
/// - `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct PseudonymSecret(Vec<u8>);

impl PseudonymSecret {
    /// Wraps secret bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PseudonymError::SecretTooShort`] for short secrets.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, PseudonymError> {
        let bytes = bytes.into();
        if bytes.len() < MIN_SECRET_BYTES {
            return Err(PseudonymError::SecretTooShort);
        }
        Ok(Self(bytes))
    }

    /// Returns the raw secret bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PseudonymSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PseudonymSecret(<redacted {} bytes>)", self.0.len())
    }
}

// ============================================================================
// SECTION: Code Key
// ============================================================================

/// Opaque storage key derived from a national code.
///
/// # Invariants
/// - Exactly [`CODE_KEY_HEX_LEN`] lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeKey(String);

impl CodeKey {
    /// Parses a stored key, rejecting anything that is not 64 lowercase hex chars.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let well_formed = value.len() == CODE_KEY_HEX_LEN
            && value.bytes().all(|byte| matches!(byte, b'0' ..= b'9' | b'a' ..= b'f'));
        well_formed.then(|| Self(value.to_string()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Pseudonymizer
// ============================================================================

/// Keyed pseudonymizer holding a prepared HMAC state.
#[derive(Clone)]
pub struct Pseudonymizer {
    /// HMAC state keyed with the process secret.
    mac: HmacSha256,
}

impl Pseudonymizer {
    /// Prepares a pseudonymizer for the given secret.
    ///
    /// # Errors
    ///
    /// Returns [`PseudonymError::Key`] when the HMAC key is rejected.
    pub fn new(secret: &PseudonymSecret) -> Result<Self, PseudonymError> {
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|err| PseudonymError::Key(err.to_string()))?;
        Ok(Self {
            mac,
        })
    }

    /// Derives the storage key for a validated code.
    #[must_use]
    pub fn pseudonymize(&self, code: &NationalCode) -> CodeKey {
        let mut mac = self.mac.clone();
        mac.update(code.as_str().as_bytes());
        CodeKey(hex_encode(&mac.finalize().into_bytes()))
    }
}

impl fmt::Debug for Pseudonymizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pseudonymizer(<keyed>)")
    }
}

/// One-shot pseudonymization of a validated code under `secret`.
///
/// # Errors
///
/// Returns [`PseudonymError`] when the secret cannot key the HMAC.
pub fn pseudonymize(code: &NationalCode, secret: &PseudonymSecret) -> Result<CodeKey, PseudonymError> {
    Ok(Pseudonymizer::new(secret)?.pseudonymize(code))
}

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(char::from(HEX[usize::from(byte >> 4)]));
        out.push(char::from(HEX[usize::from(byte & 0x0f)]));
    }
    out
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

    use super::CODE_KEY_HEX_LEN;
    use super::CodeKey;
    use super::PseudonymError;
    use super::PseudonymSecret;
    use super::Pseudonymizer;
    use super::pseudonymize;
    use crate::core::identity::NationalCode;

    fn secret(text: &str) -> PseudonymSecret {
        PseudonymSecret::new(text.as_bytes()).unwrap()
    }

    #[test]
    fn same_code_and_secret_yield_same_key() {
        let code = NationalCode::parse("0012345679").unwrap();
        let pseudonymizer = Pseudonymizer::new(&secret("a-long-enough-secret")).unwrap();
        let first = pseudonymizer.pseudonymize(&code);
        let second = pseudonymizer.pseudonymize(&code);
        assert_eq!(first, second);
        assert_eq!(first.as_str().len(), CODE_KEY_HEX_LEN);
        assert!(CodeKey::parse(first.as_str()).is_some());
    }

    #[test]
    fn changing_secret_changes_key() {
        let code = NationalCode::parse("0012345679").unwrap();
        let left = pseudonymize(&code, &secret("first-secret-value")).unwrap();
        let right = pseudonymize(&code, &secret("second-secret-value")).unwrap();
        assert_ne!(left, right);
    }

    #[test]
    fn key_never_contains_the_raw_code() {
        let code = NationalCode::parse("0012345679").unwrap();
        let key = pseudonymize(&code, &secret("a-long-enough-secret")).unwrap();
        assert!(!key.as_str().contains(code.as_str()));
    }

    #[test]
    fn matches_reference_hmac_vector() {
        let code = NationalCode::parse("1234567891").unwrap();
        let key = pseudonymize(&code, &secret("0123456789abcdef")).unwrap();
        assert_eq!(
            key.as_str(),
            "f8bc93c4989431c981f3968bb25be9b5ad57c25c7900e3c2ad88997735d84779"
        );
    }

    #[test]
    fn short_secret_is_rejected() {
        assert!(matches!(PseudonymSecret::new("short"), Err(PseudonymError::SecretTooShort)));
    }

    #[test]
    fn secret_debug_is_redacted() {
        let rendered = format!("{:?}", secret("super-secret-value-here"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn code_key_parse_rejects_malformed_values() {
        assert!(CodeKey::parse("abc").is_none());
        assert!(CodeKey::parse(&"G".repeat(CODE_KEY_HEX_LEN)).is_none());
        assert!(CodeKey::parse(&"A".repeat(CODE_KEY_HEX_LEN)).is_none());
        assert!(CodeKey::parse(&"a".repeat(CODE_KEY_HEX_LEN)).is_some());
    }
}
