// crates/score-ledger-core/src/core/normalize.rs
// ============================================================================
// Module: Score Ledger Text Normalization
// Description: Localized digit folding, field tokenization, and subject folding.
// Purpose: Give every entry point the same canonical view of user-typed text.
// Dependencies: Standard library.
// ============================================================================

//! ## Overview
//! User input arrives from chat messages, inline batches, and tabular files.
//! All of it passes through these helpers before validation so that the
//! canonical order is always normalize, then shape-check, then validate.

// ============================================================================
// SECTION: Constants
// ============================================================================

/// First code point of the Extended Arabic-Indic digit block (`۰`).
const EXTENDED_ARABIC_INDIC_ZERO: u32 = 0x06F0;
/// First code point of the Arabic-Indic digit block (`٠`).
const ARABIC_INDIC_ZERO: u32 = 0x0660;
/// Arabic decimal separator (`٫`).
const ARABIC_DECIMAL_SEPARATOR: char = '\u{066B}';

// ============================================================================
// SECTION: Digits
// ============================================================================

/// Folds Persian and Arabic-Indic digits (and the Arabic decimal separator)
/// into their ASCII equivalents. Every other character is passed through.
#[must_use]
pub fn normalize_digits(input: &str) -> String {
    input.chars().map(fold_digit).collect()
}

/// Maps a single localized digit glyph to ASCII.
fn fold_digit(ch: char) -> char {
    let code_point = u32::from(ch);
    let offset = match code_point {
        0x06F0 ..= 0x06F9 => code_point - EXTENDED_ARABIC_INDIC_ZERO,
        0x0660 ..= 0x0669 => code_point - ARABIC_INDIC_ZERO,
        _ if ch == ARABIC_DECIMAL_SEPARATOR => return '.',
        _ => return ch,
    };
    char::from_digit(offset, 10).unwrap_or(ch)
}

// ============================================================================
// SECTION: Fields
// ============================================================================

/// Returns true when `ch` separates fields in commands and inline rows.
///
/// Whitespace, `|`, and `:` are equivalent separators.
#[must_use]
pub fn is_field_separator(ch: char) -> bool {
    ch.is_whitespace() || ch == '|' || ch == ':'
}

/// Splits text into non-empty fields on any run of separators.
#[must_use]
pub fn tokenize_fields(text: &str) -> Vec<String> {
    text.split(is_field_separator).filter(|part| !part.is_empty()).map(str::to_string).collect()
}

// ============================================================================
// SECTION: Subjects
// ============================================================================

/// Folds a subject name: trims, collapses inner whitespace, lowercases.
#[must_use]
pub fn normalize_subject(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::normalize_digits;
    use super::normalize_subject;
    use super::tokenize_fields;

    #[test]
    fn persian_and_arabic_digits_fold_to_ascii() {
        assert_eq!(normalize_digits("۰۰۱۲۳۴۵۶۷۹"), "0012345679");
        assert_eq!(normalize_digits("٠١٢٣٤٥٦٧٨٩"), "0123456789");
        assert_eq!(normalize_digits("۱۷٫۵"), "17.5");
        assert_eq!(normalize_digits("math"), "math");
    }

    #[test]
    fn tokenize_treats_pipe_colon_and_space_alike() {
        assert_eq!(tokenize_fields("0012345679|math : 18"), vec!["0012345679", "math", "18"]);
        assert_eq!(tokenize_fields("  \t "), Vec::<String>::new());
    }

    #[test]
    fn subject_folding_ignores_case_and_spacing() {
        assert_eq!(normalize_subject("  Applied   MATH "), "applied math");
        assert_eq!(normalize_subject("ریاضی"), "ریاضی");
    }
}
