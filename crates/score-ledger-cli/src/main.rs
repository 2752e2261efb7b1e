// crates/score-ledger-cli/src/main.rs
// ============================================================================
// Module: Score Ledger CLI Entry Point
// Description: Command dispatcher for score lookups and administration.
// Purpose: Provide a safe, localized CLI over the score ledger.
// Dependencies: clap, score-ledger-core, score-ledger-config, score-ledger-store-sqlite, thiserror.
// ============================================================================

//! ## Overview
//! The `score-ledger` binary loads `score-ledger.toml`, opens the SQLite score
//! store, and runs one request: either a chat-style message routed the way the
//! chat front end routes it, or a direct subcommand. Replies are written to
//! stdout through the i18n catalog; diagnostics and audit events go to stderr.
//! Security posture: message text and input files are untrusted and size
//! limited before parsing.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use score_ledger_cli::i18n::Locale;
use score_ledger_cli::i18n::set_locale;
use score_ledger_cli::session::LedgerSession;
use score_ledger_cli::session::Reply;
use score_ledger_cli::session::seed_sample_rows;
use score_ledger_cli::t;
use score_ledger_cli::tabular::ImportSchema;
use score_ledger_cli::tabular::is_spreadsheet_path;
use score_ledger_cli::tabular::parse_table;
use score_ledger_config::AuditConfig;
use score_ledger_config::LedgerConfig;
use score_ledger_core::CallerId;
use score_ledger_core::LedgerAuditSink;
use score_ledger_core::LedgerFileAuditSink;
use score_ledger_core::LedgerNoopAuditSink;
use score_ledger_core::LedgerStderrAuditSink;
use score_ledger_core::Pseudonymizer;
use score_ledger_core::ScoreLedger;
use score_ledger_core::rows_from_text;
use score_ledger_store_sqlite::SqliteScoreStore;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable selecting the output language.
const LANG_ENV: &str = "SCORE_LEDGER_LANG";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "score-ledger", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `SCORE_LEDGER_LANG`).
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Path to `score-ledger.toml` (overrides `SCORE_LEDGER_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Caller identity checked against the admin list.
    #[arg(long, value_name = "ID", global = true)]
    caller: Option<String>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Ledger operations.
    #[command(flatten)]
    Ledger(LedgerCommand),
}

/// Subcommands that operate on the score store.
#[derive(Subcommand, Debug)]
enum LedgerCommand {
    /// Route one chat-style message (`/add ...`, `/help`, or a lookup).
    Message {
        /// Message text; read from stdin when omitted.
        text: Option<String>,
    },
    /// Look up scores for a national code.
    Lookup {
        /// National code.
        code: String,
        /// Optional subject name (multiple words are joined).
        subject: Vec<String>,
    },
    /// Insert or replace one score.
    Add {
        /// National code.
        code: String,
        /// Subject name.
        subject: String,
        /// Score value.
        score: String,
    },
    /// Remove one score.
    Remove {
        /// National code.
        code: String,
        /// Subject name.
        subject: String,
    },
    /// Remove every score for a national code.
    RemoveAll {
        /// National code.
        code: String,
    },
    /// List stored pseudonymized code keys.
    ListCodes,
    /// Apply `<code> <subject> <score>` rows, one per line.
    Bulk {
        /// Rows file; read from stdin when omitted or `-`.
        file: Option<PathBuf>,
    },
    /// Import a CSV or TSV file with code, subject, and score columns.
    Import {
        /// Path to the CSV/TSV file.
        file: PathBuf,
    },
    /// Insert sample rows when the store is empty.
    Seed,
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the configuration file.
    Validate,
}

/// CLI language selection.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Persian.
    Fa,
}

impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Fa => Self::Fa,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let config = LedgerConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    match command {
        Commands::Config {
            command,
        } => command_config(&command),
        Commands::Ledger(command) => {
            command_ledger(&config, CallerId::new(cli.caller.unwrap_or_default()), command)
        }
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Executes config subcommands against an already loaded config.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => {
            write_stdout_line(&t!("config.validate.ok"))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ============================================================================
// SECTION: Ledger Commands
// ============================================================================

/// Opens the ledger, runs one ledger subcommand, and prints its reply.
fn command_ledger(
    config: &LedgerConfig,
    caller: CallerId,
    command: LedgerCommand,
) -> CliResult<ExitCode> {
    let ledger = open_ledger(config)?;
    let session = LedgerSession::new(&ledger, caller);
    let reply = match command {
        LedgerCommand::Message {
            text,
        } => {
            let text = match text {
                Some(text) => text,
                None => read_stdin_text(config.import.max_file_bytes, &t!("input.kind.bulk"))?,
            };
            session.handle_message(&text)
        }
        LedgerCommand::Lookup {
            code,
            subject,
        } => {
            let subject = (!subject.is_empty()).then(|| subject.join(" "));
            session.lookup(&code, subject.as_deref())
        }
        LedgerCommand::Add {
            code,
            subject,
            score,
        } => session.upsert(&code, &subject, &score),
        LedgerCommand::Remove {
            code,
            subject,
        } => session.remove(&code, &subject),
        LedgerCommand::RemoveAll {
            code,
        } => session.remove_all(&code),
        LedgerCommand::ListCodes => session.list_codes(),
        LedgerCommand::Bulk {
            file,
        } => command_bulk(&session, config, file.as_deref())?,
        LedgerCommand::Import {
            file,
        } => command_import(&session, config, &file)?,
        LedgerCommand::Seed => seed_sample_rows(&ledger),
    };
    emit_reply(&reply)
}

// ============================================================================
// SECTION: Ledger Setup
// ============================================================================

/// Builds the ledger described by `config`.
fn open_ledger(config: &LedgerConfig) -> CliResult<ScoreLedger<SqliteScoreStore>> {
    let secret = config
        .pseudonym_secret()
        .map_err(|err| CliError::new(t!("ledger.secret_invalid", error = err)))?;
    let pseudonymizer = Pseudonymizer::new(&secret)
        .map_err(|err| CliError::new(t!("ledger.secret_invalid", error = err)))?;
    let store = SqliteScoreStore::new(&config.store)
        .map_err(|err| CliError::new(t!("ledger.store_open_failed", error = err)))?;
    let audit = audit_sink(&config.audit)?;
    Ok(ScoreLedger::new(store, pseudonymizer, config.access_gate(), config.ledger_policy())
        .with_audit_sink(audit))
}

/// Selects the audit sink configured for this run.
fn audit_sink(config: &AuditConfig) -> CliResult<Arc<dyn LedgerAuditSink>> {
    if !config.enabled {
        return Ok(Arc::new(LedgerNoopAuditSink));
    }
    match &config.path {
        Some(path) => {
            let sink = LedgerFileAuditSink::new(path).map_err(|err| {
                CliError::new(t!("audit.open_failed", path = path.display(), error = err))
            })?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(LedgerStderrAuditSink)),
    }
}

// ============================================================================
// SECTION: Batch Commands
// ============================================================================

/// Executes the `bulk` command.
fn command_bulk(
    session: &LedgerSession<'_, SqliteScoreStore>,
    config: &LedgerConfig,
    file: Option<&Path>,
) -> CliResult<Reply> {
    let kind = t!("input.kind.bulk");
    let text = match file {
        Some(path) if path != Path::new("-") => {
            read_text_file(path, config.import.max_file_bytes, &kind)?
        }
        _ => read_stdin_text(config.import.max_file_bytes, &kind)?,
    };
    let rows = rows_from_text(&text);
    if rows.is_empty() {
        return Ok(Reply::failure(t!("chat.bulk.usage")));
    }
    Ok(session.bulk(&rows))
}

/// Executes the `import` command.
fn command_import(
    session: &LedgerSession<'_, SqliteScoreStore>,
    config: &LedgerConfig,
    path: &Path,
) -> CliResult<Reply> {
    if is_spreadsheet_path(path) {
        return Ok(Reply::failure(t!("import.unsupported_format", path = path.display())));
    }
    let text = read_text_file(path, config.import.max_file_bytes, &t!("input.kind.import"))?;
    let parsed = parse_table(&text).and_then(|table| {
        ImportSchema::resolve(&table.header, &config.import.columns)
            .map(|schema| schema.candidate_rows(&table))
    });
    match parsed {
        Ok(rows) => Ok(session.bulk(&rows)),
        Err(err) => {
            Ok(Reply::failure(t!("import.parse_failed", path = path.display(), error = err)))
        }
    }
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors raised while reading bounded input.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// Input size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    read_to_limit(file, max_bytes)
}

/// Reads at most `max_bytes` from `reader`, failing when more is available.
fn read_to_limit(reader: impl Read, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let read_limit = u64::try_from(max_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let mut limited = reader.take(read_limit);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Reads a UTF-8 text file within `max_bytes`.
fn read_text_file(path: &Path, max_bytes: usize, kind: &str) -> CliResult<String> {
    let location = path.display().to_string();
    let bytes = read_bytes_with_limit(path, max_bytes)
        .map_err(|err| read_limit_error(err, kind, &location))?;
    decode_text(bytes, kind, &location)
}

/// Reads UTF-8 text from stdin within `max_bytes`.
fn read_stdin_text(max_bytes: usize, kind: &str) -> CliResult<String> {
    let location = t!("input.stdin");
    let bytes = read_to_limit(std::io::stdin().lock(), max_bytes)
        .map_err(|err| read_limit_error(err, kind, &location))?;
    decode_text(bytes, kind, &location)
}

/// Decodes input bytes as UTF-8.
fn decode_text(bytes: Vec<u8>, kind: &str, location: &str) -> CliResult<String> {
    String::from_utf8(bytes)
        .map_err(|_| CliError::new(t!("input.not_utf8", kind = kind, path = location)))
}

/// Localizes a bounded read failure.
fn read_limit_error(err: ReadLimitError, kind: &str, location: &str) -> CliError {
    match err {
        ReadLimitError::Io(err) => {
            CliError::new(t!("input.read_failed", kind = kind, path = location, error = err))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!(
            "input.read_too_large",
            kind = kind,
            path = location,
            size = size,
            limit = limit
        )),
    }
}

// ============================================================================
// SECTION: Locale Helpers
// ============================================================================

/// Resolves the output locale from the flag, then the environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        });
    }
    Ok(Locale::En)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes every reply line to stdout and maps the reply to an exit code.
fn emit_reply(reply: &Reply) -> CliResult<ExitCode> {
    for line in &reply.lines {
        write_stdout_line(line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(if reply.failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
