// crates/score-ledger-cli/tests/import_pipeline.rs
// ============================================================================
// Module: Import Pipeline Tests
// Description: End-to-end CSV import into the SQLite score store.
// Purpose: Validate reader, schema, session, store, and audit working together.
// Dependencies: score-ledger-cli, score-ledger-config, score-ledger-core, score-ledger-store-sqlite, tempfile
// ============================================================================

//! ## Overview
//! Builds a ledger from a parsed `score-ledger.toml`, imports a CSV export,
//! and checks per-row replies, lookups, and the audit log.
//!
//! Security posture: neither the database nor the audit log may contain the
//! raw national code.

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

use std::path::Path;
use std::sync::Arc;

use score_ledger_cli::session::LedgerSession;
use score_ledger_cli::tabular::ImportSchema;
use score_ledger_cli::tabular::parse_table;
use score_ledger_config::LedgerConfig;
use score_ledger_core::CallerId;
use score_ledger_core::LedgerFileAuditSink;
use score_ledger_core::Pseudonymizer;
use score_ledger_core::ScoreLedger;
use score_ledger_core::ScoreStore;
use score_ledger_store_sqlite::SqliteScoreStore;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn config_for(dir: &Path) -> LedgerConfig {
    let content = format!(
        "[identity]\nsecret = \"import-test-secret-01\"\n\n[access]\nadmins = [\"7\"]\n\n\
         [store]\npath = \"{}\"\n\n[scores]\nmin = 0.0\nmax = 20.0\n",
        dir.join("scores.db").display()
    );
    LedgerConfig::from_toml_with_env(&content, |_| None).unwrap()
}

fn open_ledger(config: &LedgerConfig, audit_path: &Path) -> ScoreLedger<SqliteScoreStore> {
    let pseudonymizer = Pseudonymizer::new(&config.pseudonym_secret().unwrap()).unwrap();
    let store = SqliteScoreStore::new(&config.store).unwrap();
    ScoreLedger::new(store, pseudonymizer, config.access_gate(), config.ledger_policy())
        .with_audit_sink(Arc::new(LedgerFileAuditSink::new(audit_path).unwrap()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn csv_import_stores_valid_rows_and_reports_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path());
    let audit_path = dir.path().join("audit.jsonl");
    let ledger = open_ledger(&config, &audit_path);

    let csv = "نمره,کد ملی,نام درس\n18,0012345679,ریاضی\n25,0084571233,فارسی\n17,0000000000,زبان\n\
               ۱۶,۰۰۸۴۵۷۱۲۳۳,زبان\n";
    let table = parse_table(csv).unwrap();
    let schema = ImportSchema::resolve(&table.header, &config.import.columns).unwrap();
    let rows = schema.candidate_rows(&table);

    let admin = LedgerSession::new(&ledger, CallerId::new("7"));
    let reply = admin.bulk(&rows);
    assert!(!reply.failed);
    assert_eq!(
        reply.lines,
        vec![
            "0012345679 ریاضی: stored".to_string(),
            "0084571233 فارسی: score 25 is out of range".to_string(),
            "0000000000: invalid national code".to_string(),
            "0084571233 زبان: stored".to_string(),
            "2 of 4 rows stored, 2 rejected.".to_string(),
        ]
    );
    assert_eq!(ledger.store().count().unwrap(), 2);

    let visitor = LedgerSession::new(&ledger, CallerId::new(""));
    let lookup = visitor.lookup("۰۰۸۴۵۷۱۲۳۳", Some("زبان"));
    assert!(lookup.lines[0].starts_with("زبان: 16 (updated: "));
    assert!(visitor.bulk(&rows).failed);

    drop(admin);
    drop(visitor);
    drop(ledger);
    let audit = std::fs::read_to_string(&audit_path).unwrap();
    let events: Vec<&str> = audit.lines().collect();
    assert_eq!(events.len(), 3);
    assert!(events[0].contains("\"operation\":\"bulk_upsert\""));
    assert!(events[0].contains("\"accepted\":2"));
    assert!(events[2].contains("\"decision\":\"deny\""));
    assert!(!audit.contains("0012345679"));
    assert!(!audit.contains("0084571233"));
}

#[test]
fn scores_persist_across_ledger_instances() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path());
    let audit_path = dir.path().join("audit.jsonl");
    {
        let ledger = open_ledger(&config, &audit_path);
        let admin = LedgerSession::new(&ledger, CallerId::new("7"));
        assert!(!admin.upsert("0012345679", "Math", "19.5").failed);
    }
    let ledger = open_ledger(&config, &audit_path);
    let reply = LedgerSession::new(&ledger, CallerId::new("")).lookup("0012345679", None);
    assert_eq!(reply.lines.len(), 1);
    assert!(reply.lines[0].starts_with("Math: 19.5"));
}
