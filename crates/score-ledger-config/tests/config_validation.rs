// crates/score-ledger-config/tests/config_validation.rs
// ============================================================================
// Module: Config Validation Tests
// Description: Validate config loading guards and fail-closed validation.
// Purpose: Ensure config input handling is strict and environment-resolved.
// Dependencies: score-ledger-config, score-ledger-core, tempfile
// ============================================================================

//! Config load and validation tests for score-ledger-config.

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
    reason = "Test-only assertions and helpers are permitted."
)]

use std::io::Write;
use std::path::Path;

use score_ledger_config::ConfigError;
use score_ledger_config::LedgerConfig;
use score_ledger_core::CallerId;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

const SECRET_TOML: &str = "[identity]\nsecret = \"unit-test-secret-0001\"\n";

fn no_env(_: &str) -> Option<String> {
    None
}

fn parse(content: &str) -> Result<LedgerConfig, ConfigError> {
    LedgerConfig::from_toml_with_env(content, no_env)
}

fn assert_invalid(result: Result<LedgerConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

#[test]
fn minimal_config_uses_defaults() -> TestResult {
    let config = parse(SECRET_TOML).map_err(|err| err.to_string())?;
    if config.store.path != Path::new("scores.db") {
        return Err("unexpected default store path".to_string());
    }
    if config.import.max_rows != 5_000 || !config.audit.enabled {
        return Err("unexpected import or audit defaults".to_string());
    }
    if !config.access_gate().is_empty() {
        return Err("default gate must admit nobody".to_string());
    }
    config.pseudonym_secret().map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn full_config_round_trips_into_runtime_values() -> TestResult {
    let content = r#"
[identity]
secret = "unit-test-secret-0001"

[access]
admins = ["1001", " 1002 "]

[store]
path = "data/ledger.db"
journal_mode = "delete"
sync_mode = "normal"

[scores]
min = 0.0
max = 20.0

[import]
max_rows = 50
columns = { code = ["id"], subject = ["lesson"], score = ["mark"] }

[audit]
enabled = false
path = "audit.jsonl"
"#;
    let config = parse(content).map_err(|err| err.to_string())?;
    let gate = config.access_gate();
    if !gate.is_privileged(&CallerId::new("1002")) || gate.len() != 2 {
        return Err("admins not applied".to_string());
    }
    let policy = config.ledger_policy();
    if policy.max_batch_rows != 50 || policy.bounds.max != Some(20.0) {
        return Err("policy not applied".to_string());
    }
    if config.import.columns.score != vec!["mark".to_string()] {
        return Err("column aliases not applied".to_string());
    }
    Ok(())
}

#[test]
fn secret_is_required() -> TestResult {
    assert_invalid(parse(""), "identity.secret or identity.secret_env is required")
}

#[test]
fn secret_sources_are_exclusive() -> TestResult {
    let content = "[identity]\nsecret = \"unit-test-secret-0001\"\nsecret_env = \"LEDGER_SECRET\"\n";
    assert_invalid(parse(content), "mutually exclusive")
}

#[test]
fn short_and_placeholder_secrets_are_rejected() -> TestResult {
    assert_invalid(parse("[identity]\nsecret = \"short\"\n"), "at least 16 bytes")?;
    assert_invalid(
        parse("[identity]\nsecret = \"replace-with-a-long-random-secret\"\n"),
        "placeholder",
    )
}

#[test]
fn secret_env_is_resolved_through_lookup() -> TestResult {
    let content = "[identity]\nsecret_env = \"LEDGER_SECRET\"\n";
    let lookup = |name: &str| (name == "LEDGER_SECRET").then(|| "env-provided-secret-01".to_string());
    let config = LedgerConfig::from_toml_with_env(content, lookup).map_err(|err| err.to_string())?;
    if config.identity.secret.as_deref() != Some("env-provided-secret-01") {
        return Err("secret_env was not resolved".to_string());
    }
    if format!("{:?}", config.identity).contains("env-provided-secret-01") {
        return Err("secret leaked through Debug".to_string());
    }
    assert_invalid(parse(content), "identity.secret_env LEDGER_SECRET is not set")
}

#[test]
fn admins_env_appends_identities() -> TestResult {
    let content = format!("{SECRET_TOML}[access]\nadmins = [\"1\"]\nadmins_env = \"LEDGER_ADMINS\"\n");
    let lookup = |name: &str| (name == "LEDGER_ADMINS").then(|| " 2, ,3 ".to_string());
    let config =
        LedgerConfig::from_toml_with_env(&content, lookup).map_err(|err| err.to_string())?;
    if config.access.admins != vec!["1", "2", "3"] {
        return Err(format!("unexpected admins {:?}", config.access.admins));
    }
    Ok(())
}

#[test]
fn invalid_admins_are_rejected() -> TestResult {
    assert_invalid(
        parse(&format!("{SECRET_TOML}[access]\nadmins = [\"  \"]\n")),
        "entries must be non-empty",
    )?;
    assert_invalid(
        parse(&format!("{SECRET_TOML}[access]\nadmins = [\"1\", \"1\"]\n")),
        "duplicate entry",
    )
}

#[test]
fn inverted_bounds_are_rejected() -> TestResult {
    assert_invalid(
        parse(&format!("{SECRET_TOML}[scores]\nmin = 20.0\nmax = 0.0\n")),
        "scores.min must not exceed scores.max",
    )?;
    assert_invalid(parse(&format!("{SECRET_TOML}[scores]\nmax = inf\n")), "scores.max must be finite")
}

#[test]
fn import_limits_and_aliases_are_checked() -> TestResult {
    assert_invalid(parse(&format!("{SECRET_TOML}[import]\nmax_rows = 0\n")), "import.max_rows")?;
    assert_invalid(
        parse(&format!(
            "{SECRET_TOML}[import.columns]\ncode = [\"Code\"]\nsubject = [\"code\"]\n"
        )),
        "already in use",
    )?;
    assert_invalid(parse(&format!("{SECRET_TOML}[import.columns]\nscore = []\n")), "at least one header")
}

#[test]
fn unknown_fields_are_rejected() -> TestResult {
    match parse(&format!("{SECRET_TOML}[store]\npath = \"a.db\"\nmystery = 1\n")) {
        Err(ConfigError::Parse(_)) => Ok(()),
        other => Err(format!("expected parse error, got {}", other.is_ok())),
    }
}

#[test]
fn load_reads_file_and_rejects_bad_inputs() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(SECRET_TOML.as_bytes()).map_err(|err| err.to_string())?;
    LedgerConfig::load(Some(file.path())).map_err(|err| err.to_string())?;

    let mut binary = NamedTempFile::new().map_err(|err| err.to_string())?;
    binary.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(LedgerConfig::load(Some(binary.path())), "config file must be utf-8")?;

    let mut large = NamedTempFile::new().map_err(|err| err.to_string())?;
    large.write_all(&vec![b'#'; 1_048_577]).map_err(|err| err.to_string())?;
    assert_invalid(LedgerConfig::load(Some(large.path())), "config file exceeds size limit")?;

    let long_component = "a".repeat(300);
    assert_invalid(
        LedgerConfig::load(Some(Path::new(&long_component))),
        "config path component too long",
    )
}
