// crates/score-ledger-cli/src/session.rs
// ============================================================================
// Module: Ledger Session
// Description: Runs ledger operations for one caller and renders replies.
// Purpose: Share reply rendering between chat messages and CLI subcommands.
// Dependencies: score-ledger-core, crate::command, crate::i18n
// ============================================================================

//! ## Overview
//! A [`LedgerSession`] binds a [`ScoreLedger`] to the caller identity of one
//! request. Each operation returns a [`Reply`]: localized lines plus a failure
//! flag the binary maps to its exit code. Ledger errors are rendered here and
//! never carry the raw code; the code only appears in replies that confirm
//! the caller's own input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use score_ledger_core::CallerId;
use score_ledger_core::CandidateRow;
use score_ledger_core::FormatIssue;
use score_ledger_core::IdentityError;
use score_ledger_core::LedgerError;
use score_ledger_core::ReconcileSummary;
use score_ledger_core::RowOutcome;
use score_ledger_core::ScoreEntry;
use score_ledger_core::ScoreLedger;
use score_ledger_core::ScoreStore;
use score_ledger_core::rows_from_text;

use crate::command::ChatCommand;
use crate::command::split_code_subject;
use crate::command::split_upsert_args;
use crate::t;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Sample rows applied by the `seed` command when the store is empty.
pub const SAMPLE_ROWS: &[[&str; 3]] = &[
    ["0012345679", "ریاضی", "18"],
    ["0012345679", "فارسی", "17"],
    ["0084571233", "زبان", "16"],
];

// ============================================================================
// SECTION: Reply
// ============================================================================

/// Localized reply to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reply lines in display order.
    pub lines: Vec<String>,
    /// True when the request was rejected.
    pub failed: bool,
}

impl Reply {
    /// Builds a successful reply.
    #[must_use]
    pub const fn ok(lines: Vec<String>) -> Self {
        Self {
            lines,
            failed: false,
        }
    }

    /// Builds a one-line successful reply.
    #[must_use]
    pub fn line(line: String) -> Self {
        Self::ok(vec![line])
    }

    /// Builds a one-line failure reply.
    #[must_use]
    pub fn failure(line: String) -> Self {
        Self {
            lines: vec![line],
            failed: true,
        }
    }

    /// Returns the reply as newline-joined text.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Ledger operations performed on behalf of one caller.
pub struct LedgerSession<'a, S: ScoreStore> {
    /// Ledger under operation.
    ledger: &'a ScoreLedger<S>,
    /// Requesting caller.
    caller: CallerId,
}

impl<'a, S: ScoreStore> LedgerSession<'a, S> {
    /// Binds `ledger` to `caller`.
    #[must_use]
    pub const fn new(ledger: &'a ScoreLedger<S>, caller: CallerId) -> Self {
        Self {
            ledger,
            caller,
        }
    }

    /// Routes and answers one chat-style message.
    #[must_use]
    pub fn handle_message(&self, text: &str) -> Reply {
        let Some(command) = ChatCommand::parse(text) else {
            return Reply::failure(t!("chat.lookup.prompt"));
        };
        if let Some(operation) = command.privileged_operation()
            && let Err(err) = self.ledger.authorize(&self.caller, operation)
        {
            return error_reply(&err);
        }
        match command {
            ChatCommand::Help => Reply::line(t!("chat.help")),
            ChatCommand::Upsert {
                args,
            } => {
                if args.is_empty() {
                    return Reply::failure(t!("chat.add.usage"));
                }
                match split_upsert_args(&args) {
                    Some((code, subject, score)) => self.upsert(code, &subject, score),
                    None => Reply::failure(t!("chat.add.format")),
                }
            }
            ChatCommand::Remove {
                args,
            } => match split_code_subject(&args) {
                Some((code, Some(subject))) => self.remove(code, &subject),
                _ => Reply::failure(t!("chat.remove.usage")),
            },
            ChatCommand::RemoveAll {
                args,
            } => match args.as_slice() {
                [code] => self.remove_all(code),
                _ => Reply::failure(t!("chat.remove_all.usage")),
            },
            ChatCommand::ListCodes => self.list_codes(),
            ChatCommand::Bulk {
                payload,
            } => {
                let rows = rows_from_text(&payload);
                if rows.is_empty() {
                    return Reply::failure(t!("chat.bulk.usage"));
                }
                self.bulk(&rows)
            }
            ChatCommand::Lookup {
                args,
            } => match split_code_subject(&args) {
                Some((code, subject)) => self.lookup(code, subject.as_deref()),
                None => Reply::failure(t!("chat.lookup.prompt")),
            },
            ChatCommand::Unknown {
                name,
            } => Reply::failure(t!("chat.unknown_command", command = name)),
        }
    }

    /// Inserts or replaces one score.
    #[must_use]
    pub fn upsert(&self, code: &str, subject: &str, score: &str) -> Reply {
        match self.ledger.upsert_score(&self.caller, code, subject, score) {
            Ok(receipt) => Reply::line(t!(
                "chat.add.ok",
                subject = receipt.subject,
                code = receipt.code.as_str()
            )),
            Err(err) => error_reply(&err),
        }
    }

    /// Removes one score.
    #[must_use]
    pub fn remove(&self, code: &str, subject: &str) -> Reply {
        match self.ledger.remove_score(&self.caller, code, subject) {
            Ok(true) => Reply::line(t!(
                "chat.remove.ok",
                subject = subject.trim(),
                code = code.trim()
            )),
            Ok(false) => Reply::line(t!("chat.remove.missing")),
            Err(err) => error_reply(&err),
        }
    }

    /// Removes every score for a code.
    #[must_use]
    pub fn remove_all(&self, code: &str) -> Reply {
        match self.ledger.remove_all_scores(&self.caller, code) {
            Ok(count) => Reply::line(t!("chat.remove_all.ok", count = count)),
            Err(err) => error_reply(&err),
        }
    }

    /// Lists stored code keys.
    #[must_use]
    pub fn list_codes(&self) -> Reply {
        match self.ledger.list_code_keys(&self.caller) {
            Ok(keys) if keys.is_empty() => Reply::line(t!("chat.list.empty")),
            Ok(keys) => {
                let mut lines = Vec::with_capacity(keys.len() + 1);
                lines.push(t!("chat.list.header", limit = self.ledger.policy().list_limit));
                lines.extend(keys.iter().map(ToString::to_string));
                Reply::ok(lines)
            }
            Err(err) => error_reply(&err),
        }
    }

    /// Applies candidate rows and reports one line per row plus a summary.
    #[must_use]
    pub fn bulk(&self, rows: &[CandidateRow]) -> Reply {
        match self.ledger.bulk_upsert(&self.caller, rows) {
            Ok(outcomes) => Reply::ok(batch_lines(rows, &outcomes)),
            Err(err) => error_reply(&err),
        }
    }

    /// Looks up every score for a code, or one subject when given.
    #[must_use]
    pub fn lookup(&self, code: &str, subject: Option<&str>) -> Reply {
        match subject {
            None => match self.ledger.lookup_scores(&self.caller, code) {
                Ok(entries) if entries.is_empty() => Reply::line(t!("lookup.none")),
                Ok(entries) => Reply::ok(entries.iter().map(entry_line).collect()),
                Err(err) => error_reply(&err),
            },
            Some(subject) => match self.ledger.lookup_subject(&self.caller, code, subject) {
                Ok(Some(entry)) => Reply::line(entry_line(&entry)),
                Ok(None) => Reply::line(t!("lookup.subject_missing")),
                Err(err) => error_reply(&err),
            },
        }
    }
}

/// Applies [`SAMPLE_ROWS`] when the ledger's store is empty.
#[must_use]
pub fn seed_sample_rows<S: ScoreStore>(ledger: &ScoreLedger<S>) -> Reply {
    let rows: Vec<CandidateRow> = SAMPLE_ROWS
        .iter()
        .enumerate()
        .map(|(index, fields)| CandidateRow::from_fields(index + 1, fields))
        .collect();
    match ledger.seed_if_empty(&rows) {
        Ok(Some(outcomes)) => {
            let summary = ReconcileSummary::from_outcomes(&outcomes);
            Reply::line(t!("seed.applied", accepted = summary.accepted))
        }
        Ok(None) => Reply::line(t!("seed.skipped")),
        Err(err) => error_reply(&err),
    }
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders a ledger error as a localized message.
#[must_use]
pub fn error_message(err: &LedgerError) -> String {
    match err {
        LedgerError::Validation(IdentityError::Shape) => t!("error.code_shape"),
        LedgerError::Validation(_) => t!("error.code_invalid"),
        LedgerError::Format(FormatIssue::MissingSubject) => t!("error.subject_missing"),
        LedgerError::Format(_) => t!("error.format"),
        LedgerError::Parse => t!("error.score_parse"),
        LedgerError::OutOfRange {
            score,
        } => t!("error.score_range", score = score),
        LedgerError::Storage(error) => t!("error.storage", error = error),
        LedgerError::Authorization(_) => t!("error.denied"),
        LedgerError::BatchTooLarge {
            rows,
            max,
        } => t!("error.batch_too_large", rows = rows, max = max),
    }
}

/// Renders one batch row outcome.
#[must_use]
pub fn outcome_line(row: &CandidateRow, outcome: &RowOutcome) -> String {
    match outcome {
        RowOutcome::Accepted {
            code,
            subject,
        } => t!("bulk.row.accepted", code = code.as_str(), subject = subject),
        RowOutcome::RejectedInvalidCode {
            code,
        } => t!("bulk.row.invalid_code", code = code),
        RowOutcome::RejectedBadFormat {
            ..
        } => t!("bulk.row.bad_format", line = row.line),
        RowOutcome::RejectedUnparsableScore {
            code,
            subject,
        } => t!("bulk.row.unparsable_score", code = code.as_str(), subject = subject),
        RowOutcome::RejectedScoreOutOfRange {
            code,
            subject,
            score,
        } => t!("bulk.row.out_of_range", code = code.as_str(), subject = subject, score = score),
        RowOutcome::RejectedStorage {
            code,
            subject,
        } => t!("bulk.row.storage_failed", code = code.as_str(), subject = subject),
    }
}

/// Renders batch outcomes followed by a summary line.
fn batch_lines(rows: &[CandidateRow], outcomes: &[RowOutcome]) -> Vec<String> {
    let summary = ReconcileSummary::from_outcomes(outcomes);
    let mut lines: Vec<String> =
        rows.iter().zip(outcomes).map(|(row, outcome)| outcome_line(row, outcome)).collect();
    lines.push(t!(
        "bulk.summary",
        accepted = summary.accepted,
        rows = summary.rows,
        rejected = summary.rejected
    ));
    lines
}

/// Renders one stored score.
fn entry_line(entry: &ScoreEntry) -> String {
    t!(
        "lookup.entry",
        subject = capitalize(entry.subject.as_str()),
        score = entry.score,
        updated_at = entry.updated_at
    )
}

/// Uppercases the first character of a subject for display.
fn capitalize(subject: &str) -> String {
    let mut chars = subject.chars();
    chars.next().map_or_else(String::new, |first| first.to_uppercase().chain(chars).collect())
}

/// Builds a failure reply from a ledger error.
fn error_reply(err: &LedgerError) -> Reply {
    Reply::failure(error_message(err))
}
