// crates/score-ledger-cli/src/tests/session.rs
// ============================================================================
// Module: Ledger Session Tests
// Description: Unit tests for message handling and reply rendering.
// Purpose: Ensure replies match each ledger outcome and gating comes first.
// Dependencies: score-ledger-cli session module, score-ledger-core
// ============================================================================

//! ## Overview
//! Drives [`LedgerSession`] over an in-memory store, checking reply text and
//! failure flags for admin and visitor callers.

use score_ledger_core::AccessGate;
use score_ledger_core::CallerId;
use score_ledger_core::InMemoryScoreStore;
use score_ledger_core::LedgerPolicy;
use score_ledger_core::PseudonymSecret;
use score_ledger_core::Pseudonymizer;
use score_ledger_core::ScoreBounds;
use score_ledger_core::ScoreLedger;
use score_ledger_core::ScoreStore;

use crate::session::LedgerSession;
use crate::session::Reply;
use crate::session::SAMPLE_ROWS;
use crate::session::seed_sample_rows;

const ADMIN: &str = "1001";
const CODE: &str = "0012345679";

fn ledger_with(policy: LedgerPolicy) -> ScoreLedger<InMemoryScoreStore> {
    let pseudonymizer =
        Pseudonymizer::new(&PseudonymSecret::new("session-test-secret-1").unwrap()).unwrap();
    ScoreLedger::new(
        InMemoryScoreStore::default(),
        pseudonymizer,
        AccessGate::new([CallerId::new(ADMIN)]),
        policy,
    )
}

fn ledger() -> ScoreLedger<InMemoryScoreStore> {
    ledger_with(LedgerPolicy::default())
}

fn say(ledger: &ScoreLedger<InMemoryScoreStore>, caller: &str, text: &str) -> Reply {
    LedgerSession::new(ledger, CallerId::new(caller)).handle_message(text)
}

#[test]
fn admin_add_then_visitor_lookup() {
    let ledger = ledger();
    let added = say(&ledger, ADMIN, "/add 0012345679 Math 18");
    assert!(!added.failed);
    assert_eq!(added.text(), "Score for math saved for code 0012345679.");

    let found = say(&ledger, "", "۰۰۱۲۳۴۵۶۷۹");
    assert!(!found.failed);
    assert_eq!(found.lines.len(), 1);
    assert!(found.lines[0].starts_with("Math: 18 (updated: "));

    let one = say(&ledger, "42", "0012345679|MATH");
    assert!(one.lines[0].starts_with("Math: 18"));
}

#[test]
fn visitors_are_denied_before_usage_checks() {
    let ledger = ledger();
    for text in ["/add", "/add 0012345679 math 18", "/remove_all", "/list_codes", "/add_bulk"] {
        let reply = say(&ledger, "42", text);
        assert!(reply.failed, "{text}");
        assert_eq!(reply.text(), "Only admins may use this command.", "{text}");
    }
    assert_eq!(ledger.store().count().unwrap(), 0);
}

#[test]
fn admin_usage_and_format_hints() {
    let ledger = ledger();
    assert_eq!(say(&ledger, ADMIN, "/add").text(), "Usage: /add <code> <subject> <score>");
    assert!(say(&ledger, ADMIN, "/add 0012345679 18").text().starts_with("Wrong format."));
    assert_eq!(say(&ledger, ADMIN, "/remove 0012345679").text(), "Usage: /remove <code> <subject>");
    assert_eq!(say(&ledger, ADMIN, "/remove_all").text(), "Usage: /remove_all <code>");
    assert!(say(&ledger, ADMIN, "/add_bulk").failed);
}

#[test]
fn validation_errors_distinguish_shape_and_checksum() {
    let ledger = ledger();
    let shape = say(&ledger, "", "12345");
    assert!(shape.failed);
    assert_eq!(shape.text(), "Please send your 10-digit national code.");
    let checksum = say(&ledger, "", "0012345674");
    assert_eq!(checksum.text(), "Invalid national code. Please check it again.");
    assert!(!checksum.text().contains("0012345674"));
    let parse = say(&ledger, ADMIN, "/add 0012345679 math eighteen");
    assert_eq!(parse.text(), "Score must be a number (for example 18 or 17.5).");
}

#[test]
fn lookups_report_missing_scores_without_failing() {
    let ledger = ledger();
    let none = say(&ledger, "", CODE);
    assert!(!none.failed);
    assert_eq!(none.text(), "No scores are recorded for this national code.");
    let missing = say(&ledger, "", "0012345679 art");
    assert_eq!(missing.text(), "No score is recorded for this subject and national code.");
}

#[test]
fn remove_and_remove_all_report_counts() {
    let ledger = ledger();
    say(&ledger, ADMIN, "/add 0012345679 math 18");
    say(&ledger, ADMIN, "/add 0012345679 art 12");
    assert_eq!(say(&ledger, ADMIN, "/remove 0012345679 chemistry").text(), "No such score was found.");
    assert_eq!(
        say(&ledger, ADMIN, "/remove 0012345679 math").text(),
        "Score for math removed for code 0012345679."
    );
    assert_eq!(say(&ledger, ADMIN, "/remove_all 0012345679").text(), "1 rows removed for this code.");
    assert_eq!(say(&ledger, ADMIN, "/remove_all 0012345679").text(), "0 rows removed for this code.");
}

#[test]
fn bulk_reports_one_line_per_row_and_summary() {
    let ledger = ledger();
    let reply = say(
        &ledger,
        ADMIN,
        "/add_bulk\n0012345679 math 18\nbad-line\n0012345674 art 10\n0084571233|physics|x",
    );
    assert!(!reply.failed);
    assert_eq!(
        reply.lines,
        vec![
            "0012345679 math: stored".to_string(),
            "line 2: wrong format".to_string(),
            "0012345674: invalid national code".to_string(),
            "0084571233 physics: score must be a number".to_string(),
            "1 of 4 rows stored, 3 rejected.".to_string(),
        ]
    );
    assert_eq!(ledger.store().count().unwrap(), 1);
}

#[test]
fn out_of_range_and_batch_limits_are_rendered() {
    let policy = LedgerPolicy {
        bounds: ScoreBounds {
            min: Some(0.0),
            max: Some(20.0),
        },
        max_batch_rows: 1,
        ..LedgerPolicy::default()
    };
    let ledger = ledger_with(policy);
    assert_eq!(
        say(&ledger, ADMIN, "/add 0012345679 math 21").text(),
        "Score 21 is outside the allowed range."
    );
    let batch = say(&ledger, ADMIN, "/add_bulk\n0012345679 math 18\n0084571233 art 17");
    assert!(batch.failed);
    assert_eq!(batch.text(), "The batch has 2 rows; the limit is 1.");
}

#[test]
fn list_codes_shows_header_and_keys() {
    let ledger = ledger();
    assert_eq!(say(&ledger, ADMIN, "/list_codes").text(), "No data has been recorded.");
    say(&ledger, ADMIN, "/add 0012345679 math 18");
    say(&ledger, ADMIN, "/add 0084571233 math 18");
    let reply = say(&ledger, ADMIN, "/list_codes");
    assert_eq!(reply.lines[0], "Pseudonymized codes (up to 200):");
    assert_eq!(reply.lines.len(), 3);
    assert!(reply.lines[1 ..].iter().all(|line| line.len() == 64));
    assert!(!reply.text().contains(CODE));
}

#[test]
fn help_and_unknown_commands() {
    let ledger = ledger();
    assert!(say(&ledger, "", "/start").text().contains("/remove_all"));
    let unknown = say(&ledger, "", "/add_file");
    assert!(unknown.failed);
    assert_eq!(unknown.text(), "Unknown command /add_file. Send /help for usage.");
    assert!(say(&ledger, "", "  ").failed);
}

#[test]
fn seeding_applies_sample_rows_once() {
    let ledger = ledger();
    assert_eq!(
        seed_sample_rows(&ledger).text(),
        format!("Sample data added: {} rows.", SAMPLE_ROWS.len())
    );
    assert_eq!(
        seed_sample_rows(&ledger).text(),
        "The store already holds records; sample data was not added."
    );
    let reply = say(&ledger, "", "0012345679");
    assert_eq!(reply.lines.len(), 2);
}
