// crates/score-ledger-config/src/config.rs
// ============================================================================
// Module: Score Ledger Configuration
// Description: Configuration loading and validation for the score ledger.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: score-ledger-core, score-ledger-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Environment indirections (`secret_env`, `admins_env`) are resolved once at
//! load time, so the resulting [`LedgerConfig`] is a complete immutable value.
//! Missing or invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use score_ledger_core::AccessGate;
use score_ledger_core::CallerId;
use score_ledger_core::DEFAULT_MAX_BATCH_ROWS;
use score_ledger_core::LIST_CODES_LIMIT;
use score_ledger_core::LedgerPolicy;
use score_ledger_core::PseudonymSecret;
use score_ledger_core::ScoreBounds;
use score_ledger_store_sqlite::SqliteStoreConfig;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "score-ledger.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SCORE_LEDGER_CONFIG";
/// Default database filename.
const DEFAULT_STORE_PATH: &str = "scores.db";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of admin identities.
pub const MAX_ADMINS: usize = 256;
/// Maximum length of an admin identity.
const MAX_ADMIN_ID_LENGTH: usize = 128;
/// Maximum configurable batch size.
pub const MAX_IMPORT_ROWS: usize = 100_000;
/// Default import file size limit in bytes.
const DEFAULT_MAX_FILE_BYTES: usize = 5 * 1024 * 1024;
/// Maximum configurable import file size in bytes.
pub const MAX_IMPORT_FILE_BYTES: usize = 64 * 1024 * 1024;
/// Placeholder secret shipped in sample deployments; never accepted.
const PLACEHOLDER_SECRET: &str = "replace-with-a-long-random-secret";

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Top-level score ledger configuration.
///
/// # Invariants
/// - After [`LedgerConfig::load`], `identity.secret` holds the resolved secret
///   and `access.admins` includes identities from `access.admins_env`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Pseudonymization secret configuration.
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Privileged caller configuration.
    #[serde(default)]
    pub access: AccessConfig,
    /// Durable store configuration.
    #[serde(default = "default_store_config")]
    pub store: SqliteStoreConfig,
    /// Optional score bounds.
    #[serde(default)]
    pub scores: ScoreBounds,
    /// Bulk import limits and column names.
    #[serde(default)]
    pub import: ImportConfig,
    /// Audit event configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl LedgerConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_with_env(content, |name| env::var(name).ok())
    }

    /// Parses and validates configuration text, resolving environment
    /// indirections through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing, resolution, or validation fails.
    pub fn from_toml_with_env<F>(content: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.identity.resolve(&lookup)?;
        config.access.resolve(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.identity.validate()?;
        self.access.validate()?;
        validate_path_string("store.path", &self.store.path.to_string_lossy())?;
        validate_bounds(&self.scores)?;
        self.import.validate()?;
        self.audit.validate()?;
        Ok(())
    }

    /// Returns the validated pseudonymization secret.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when no usable secret is configured.
    pub fn pseudonym_secret(&self) -> Result<PseudonymSecret, ConfigError> {
        let secret = self
            .identity
            .secret
            .as_deref()
            .ok_or_else(|| ConfigError::Invalid("identity secret is not resolved".to_string()))?;
        PseudonymSecret::new(secret.as_bytes())
            .map_err(|err| ConfigError::Invalid(format!("identity.secret: {err}")))
    }

    /// Builds the access gate from the configured admins.
    #[must_use]
    pub fn access_gate(&self) -> AccessGate {
        AccessGate::new(self.access.admins.iter().map(CallerId::new))
    }

    /// Builds the ledger operating limits.
    #[must_use]
    pub const fn ledger_policy(&self) -> LedgerPolicy {
        LedgerPolicy {
            bounds: self.scores,
            max_batch_rows: self.import.max_rows,
            list_limit: LIST_CODES_LIMIT,
        }
    }
}

/// Returns the default store configuration.
fn default_store_config() -> SqliteStoreConfig {
    SqliteStoreConfig::new(DEFAULT_STORE_PATH)
}

// ============================================================================
// SECTION: Identity
// ============================================================================

/// Pseudonymization secret configuration.
///
/// # Invariants
/// - Exactly one of `secret` or `secret_env` is configured.
/// - The secret is never rendered by `Debug`.
#[derive(Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Inline secret (resolved from `secret_env` at load time).
    #[serde(default)]
    pub secret: Option<String>,
    /// Environment variable holding the secret.
    #[serde(default)]
    pub secret_env: Option<String>,
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("secret_env", &self.secret_env)
            .finish()
    }
}

impl IdentityConfig {
    /// Resolves `secret_env` into `secret`.
    fn resolve<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match (self.secret.is_some(), self.secret_env.as_deref()) {
            (true, Some(_)) => Err(ConfigError::Invalid(
                "identity.secret and identity.secret_env are mutually exclusive".to_string(),
            )),
            (false, None) => Err(ConfigError::Invalid(
                "identity.secret or identity.secret_env is required".to_string(),
            )),
            (true, None) => Ok(()),
            (false, Some(name)) => {
                let value = lookup(name).filter(|value| !value.is_empty()).ok_or_else(|| {
                    ConfigError::Invalid(format!("identity.secret_env {name} is not set"))
                })?;
                self.secret = Some(value);
                Ok(())
            }
        }
    }

    /// Validates the resolved secret.
    fn validate(&self) -> Result<(), ConfigError> {
        let Some(secret) = &self.secret else {
            return Err(ConfigError::Invalid("identity secret is not resolved".to_string()));
        };
        if secret == PLACEHOLDER_SECRET {
            return Err(ConfigError::Invalid(
                "identity.secret must not be the placeholder value".to_string(),
            ));
        }
        PseudonymSecret::new(secret.as_bytes())
            .map(|_| ())
            .map_err(|err| ConfigError::Invalid(format!("identity.secret: {err}")))
    }
}

// ============================================================================
// SECTION: Access
// ============================================================================

/// Privileged caller configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessConfig {
    /// Privileged caller identities.
    #[serde(default)]
    pub admins: Vec<String>,
    /// Environment variable holding comma-separated identities.
    #[serde(default)]
    pub admins_env: Option<String>,
}

impl AccessConfig {
    /// Appends identities from `admins_env`.
    fn resolve<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(name) = &self.admins_env else {
            return Ok(());
        };
        if name.trim().is_empty() {
            return Err(ConfigError::Invalid("access.admins_env must be non-empty".to_string()));
        }
        if let Some(value) = lookup(name) {
            self.admins.extend(
                value.split(',').map(str::trim).filter(|id| !id.is_empty()).map(str::to_string),
            );
        }
        Ok(())
    }

    /// Validates admin identities.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.admins.len() > MAX_ADMINS {
            return Err(ConfigError::Invalid(format!(
                "access.admins exceeds max entries ({MAX_ADMINS})"
            )));
        }
        let mut seen = BTreeSet::new();
        for admin in &self.admins {
            let trimmed = admin.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::Invalid("access.admins entries must be non-empty".to_string()));
            }
            if trimmed.len() > MAX_ADMIN_ID_LENGTH {
                return Err(ConfigError::Invalid("access.admins entry too long".to_string()));
            }
            if !seen.insert(trimmed) {
                return Err(ConfigError::Invalid(format!("access.admins duplicate entry: {trimmed}")));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Import
// ============================================================================

/// Bulk import limits and column naming.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportConfig {
    /// Maximum rows per batch.
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
    /// Maximum tabular file size in bytes.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,
    /// Accepted header names per column.
    #[serde(default)]
    pub columns: ColumnAliases,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_rows: default_max_rows(),
            max_file_bytes: default_max_file_bytes(),
            columns: ColumnAliases::default(),
        }
    }
}

impl ImportConfig {
    /// Validates import limits and aliases.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_rows == 0 || self.max_rows > MAX_IMPORT_ROWS {
            return Err(ConfigError::Invalid(format!(
                "import.max_rows must be between 1 and {MAX_IMPORT_ROWS}"
            )));
        }
        if self.max_file_bytes == 0 || self.max_file_bytes > MAX_IMPORT_FILE_BYTES {
            return Err(ConfigError::Invalid(format!(
                "import.max_file_bytes must be between 1 and {MAX_IMPORT_FILE_BYTES}"
            )));
        }
        self.columns.validate()
    }
}

/// Returns the default batch row limit.
const fn default_max_rows() -> usize {
    DEFAULT_MAX_BATCH_ROWS
}

/// Returns the default import file size limit.
const fn default_max_file_bytes() -> usize {
    DEFAULT_MAX_FILE_BYTES
}

/// Accepted header names for each import column.
///
/// # Invariants
/// - Each list is non-empty.
/// - No alias (case-insensitive) names two columns.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnAliases {
    /// Headers naming the national code column.
    #[serde(default = "default_code_aliases")]
    pub code: Vec<String>,
    /// Headers naming the subject column.
    #[serde(default = "default_subject_aliases")]
    pub subject: Vec<String>,
    /// Headers naming the score column.
    #[serde(default = "default_score_aliases")]
    pub score: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            code: default_code_aliases(),
            subject: default_subject_aliases(),
            score: default_score_aliases(),
        }
    }
}

impl ColumnAliases {
    /// Validates alias lists.
    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for (column, aliases) in
            [("code", &self.code), ("subject", &self.subject), ("score", &self.score)]
        {
            if aliases.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "import.columns.{column} must list at least one header"
                )));
            }
            for alias in aliases {
                let folded = alias.trim().to_lowercase();
                if folded.is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "import.columns.{column} contains an empty header"
                    )));
                }
                if !seen.insert(folded) {
                    return Err(ConfigError::Invalid(format!(
                        "import.columns.{column} header {alias} is already in use"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Returns the default code column headers.
fn default_code_aliases() -> Vec<String> {
    ["code", "national_code", "national code", "کد ملی", "کدملی"].map(String::from).to_vec()
}

/// Returns the default subject column headers.
fn default_subject_aliases() -> Vec<String> {
    ["subject", "course", "درس", "نام درس"].map(String::from).to_vec()
}

/// Returns the default score column headers.
fn default_score_aliases() -> Vec<String> {
    ["score", "grade", "نمره"].map(String::from).to_vec()
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit event configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Enables audit events.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional JSON-lines file; stderr when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl AuditConfig {
    /// Validates the audit file path when present.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", &path.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Returns the default audit toggle.
const fn default_audit_enabled() -> bool {
    true
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates optional score bounds.
fn validate_bounds(bounds: &ScoreBounds) -> Result<(), ConfigError> {
    for (field, value) in [("scores.min", bounds.min), ("scores.max", bounds.max)] {
        if value.is_some_and(|value| !value.is_finite()) {
            return Err(ConfigError::Invalid(format!("{field} must be finite")));
        }
    }
    if let (Some(min), Some(max)) = (bounds.min, bounds.max)
        && min > max
    {
        return Err(ConfigError::Invalid("scores.min must not exceed scores.max".to_string()));
    }
    Ok(())
}
