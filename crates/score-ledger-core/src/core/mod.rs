// crates/score-ledger-core/src/core/mod.rs
// ============================================================================
// Module: Score Ledger Core Types
// Description: Identity, pseudonymization, record, and access types.
// Purpose: Provide the pure building blocks shared by every ledger surface.
// Dependencies: hmac, serde, sha2, thiserror, time
// ============================================================================

//! ## Overview
//! Core types are pure: no I/O, no global state. Validation, pseudonymization,
//! normalization, and access decisions live here so the store and the outer
//! crates depend on one definition of each rule.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod access;
pub mod hashing;
pub mod identifiers;
pub mod identity;
pub mod normalize;
pub mod record;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use access::AccessDenied;
pub use access::AccessGate;
pub use hashing::CODE_KEY_HEX_LEN;
pub use hashing::CodeKey;
pub use hashing::MIN_SECRET_BYTES;
pub use hashing::PseudonymError;
pub use hashing::PseudonymSecret;
pub use hashing::Pseudonymizer;
pub use hashing::pseudonymize;
pub use identifiers::CallerId;
pub use identifiers::SubjectName;
pub use identity::IdentityError;
pub use identity::NATIONAL_CODE_LEN;
pub use identity::NationalCode;
pub use identity::has_code_shape;
pub use identity::validate_national_code;
pub use normalize::normalize_digits;
pub use normalize::normalize_subject;
pub use normalize::tokenize_fields;
pub use record::ScoreBounds;
pub use record::ScoreEntry;
pub use record::ScoreError;
pub use record::ScoreRecord;
pub use record::parse_bounded_score;
pub use record::parse_score;
pub use time::Timestamp;
