// crates/score-ledger-cli/src/tests/i18n.rs
// ============================================================================
// Module: CLI i18n Tests
// Description: Unit tests for catalog parity and locale parsing.
// Purpose: Ensure English and Persian replies stay consistent.
// Dependencies: score-ledger-cli i18n module
// ============================================================================

//! ## Overview
//! Verifies the CLI message catalogs stay in sync, locale parsing is tolerant,
//! and Persian templates preserve placeholder parity with English.

use std::collections::BTreeSet;

use crate::i18n::Locale;
use crate::i18n::MessageArg;
use crate::i18n::SUPPORTED_LOCALES;
use crate::i18n::catalog_entries_for;
use crate::i18n::catalog_for;
use crate::i18n::translate_in;

fn parse_placeholder_names(template: &str) -> Result<BTreeSet<String>, String> {
    let mut placeholders = BTreeSet::new();
    let mut rest = template;
    while let Some(start) = rest.find(['{', '}']) {
        if rest[start ..].starts_with('}') {
            return Err(format!("unmatched '}}' in {template}"));
        }
        let after = &rest[start + 1 ..];
        let end = after.find('}').ok_or_else(|| format!("unclosed '{{' in {template}"))?;
        let name = &after[.. end];
        if name.is_empty() || name.contains('{') {
            return Err(format!("malformed placeholder in {template}"));
        }
        if !name.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_') {
            return Err(format!("placeholder '{name}' must use [a-z0-9_]"));
        }
        placeholders.insert(name.to_string());
        rest = &after[end + 1 ..];
    }
    Ok(placeholders)
}

#[test]
fn catalogs_have_matching_keys() {
    assert!(SUPPORTED_LOCALES.contains(&Locale::En), "English must remain the baseline locale");
    let en_keys: BTreeSet<&'static str> = catalog_for(Locale::En).keys().copied().collect();
    for locale in SUPPORTED_LOCALES {
        let locale_keys: BTreeSet<&'static str> = catalog_for(*locale).keys().copied().collect();
        assert_eq!(en_keys, locale_keys, "locale catalogs must stay in parity ({locale:?})");
    }
}

#[test]
fn catalogs_have_unique_keys_per_locale() {
    for locale in SUPPORTED_LOCALES {
        let entries = catalog_entries_for(*locale);
        let unique: BTreeSet<&str> = entries.iter().map(|(key, _)| *key).collect();
        assert_eq!(unique.len(), entries.len(), "duplicate keys in {locale:?}");
    }
}

#[test]
fn catalogs_have_placeholder_parity_with_english() {
    for (key, en_template) in catalog_entries_for(Locale::En) {
        let expected = parse_placeholder_names(en_template).unwrap();
        let fa_template = catalog_for(Locale::Fa).get(key).copied().expect("fa key exists");
        let actual = parse_placeholder_names(fa_template)
            .unwrap_or_else(|error| panic!("invalid placeholder syntax for '{key}': {error}"));
        assert_eq!(expected, actual, "placeholder set mismatch for key '{key}'");
    }
}

#[test]
fn persian_replies_differ_for_chat_keys() {
    const CURATED_KEYS: &[&str] =
        &["chat.help", "error.denied", "lookup.none", "bulk.row.accepted", "config.validate.ok"];
    for key in CURATED_KEYS {
        let en = catalog_for(Locale::En).get(key).copied().expect("en key exists");
        let fa = catalog_for(Locale::Fa).get(key).copied().expect("fa key exists");
        assert_ne!(en, fa, "Persian reply must differ from English for '{key}'");
    }
}

#[test]
fn locale_parse_accepts_region_tags_and_case() {
    assert_eq!(Locale::parse("en"), Some(Locale::En));
    assert_eq!(Locale::parse("EN"), Some(Locale::En));
    assert_eq!(Locale::parse("en-US"), Some(Locale::En));
    assert_eq!(Locale::parse("fa"), Some(Locale::Fa));
    assert_eq!(Locale::parse("FA_ir"), Some(Locale::Fa));
    assert_eq!(Locale::parse(""), None);
    assert_eq!(Locale::parse("de"), None);
}

#[test]
fn translate_in_substitutes_persian_placeholders() {
    let output = translate_in(
        Locale::Fa,
        "bulk.row.accepted",
        vec![MessageArg::new("code", "0012345679"), MessageArg::new("subject", "ریاضی")],
    );
    assert_eq!(output, "0012345679 ریاضی: ثبت شد");
}

#[test]
fn translate_in_falls_back_to_english_then_key() {
    assert_eq!(translate_in(Locale::Fa, "missing.key", Vec::new()), "missing.key");
    assert_eq!(
        translate_in(Locale::En, "chat.remove_all.ok", vec![MessageArg::new("count", "2")]),
        "2 rows removed for this code."
    );
}
