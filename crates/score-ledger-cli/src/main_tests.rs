// crates/score-ledger-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for bounded input reads and locale resolution.
// Purpose: Ensure oversized inputs fail closed and locale flags win over env.
// Dependencies: score-ledger-cli main helpers, tempfile
// ============================================================================

//! ## Overview
//! Validates `read_bytes_with_limit` and `read_to_limit` enforce size limits
//! for CLI inputs, and `resolve_locale` prefers the flag over the environment.
//!
//! Security posture: CLI inputs are untrusted; size limits must fail closed.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use score_ledger_cli::i18n::Locale;
use tempfile::NamedTempFile;

use super::LangArg;
use super::ReadLimitError;
use super::read_bytes_with_limit;
use super::read_text_file;
use super::read_to_limit;
use super::resolve_locale;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn read_bytes_with_limit_accepts_exact_size() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"0012345679 math 18").unwrap();
    let bytes = read_bytes_with_limit(file.path(), 18).unwrap();
    assert_eq!(bytes.len(), 18);
}

#[test]
fn read_bytes_with_limit_rejects_oversized_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&[b'a'; 32]).unwrap();
    match read_bytes_with_limit(file.path(), 16) {
        Err(ReadLimitError::TooLarge {
            size,
            limit,
        }) => {
            assert_eq!(size, 32);
            assert_eq!(limit, 16);
        }
        other => panic!("expected size error, got {other:?}"),
    }
}

#[test]
fn read_to_limit_rejects_unbounded_streams() {
    let data = vec![b'x'; 10];
    assert!(matches!(
        read_to_limit(data.as_slice(), 9),
        Err(ReadLimitError::TooLarge {
            size: 10,
            limit: 9
        })
    ));
    assert_eq!(read_to_limit(data.as_slice(), 10).unwrap().len(), 10);
}

#[test]
fn read_text_file_rejects_invalid_utf8() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&[0xFF, 0xFE, 0x00]).unwrap();
    let err = read_text_file(file.path(), 1024, "import file").unwrap_err();
    assert!(err.to_string().contains("not valid UTF-8"));
}

#[test]
fn resolve_locale_prefers_flag_then_env() {
    assert_eq!(resolve_locale(Some(LangArg::Fa), Some("en")).unwrap(), Locale::Fa);
    assert_eq!(resolve_locale(None, Some("fa-IR")).unwrap(), Locale::Fa);
    assert_eq!(resolve_locale(None, None).unwrap(), Locale::En);
    let err = resolve_locale(None, Some("de")).unwrap_err();
    assert!(err.to_string().contains("SCORE_LEDGER_LANG"));
}
