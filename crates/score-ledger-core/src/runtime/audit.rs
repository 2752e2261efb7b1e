// crates/score-ledger-core/src/runtime/audit.rs
// ============================================================================
// Module: Score Ledger Audit Logging
// Description: Structured audit events for ledger operations.
// Purpose: Emit redacted JSON-line records of every ledger decision.
// Dependencies: crate::core, serde, serde_json
// ============================================================================

//! ## Overview
//! Each ledger operation emits one [`LedgerAuditEvent`]. Events carry code
//! keys only; raw national codes never reach a sink. Sinks are fire-and-forget
//! so an unavailable log target cannot fail a ledger operation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::CallerId;
use crate::core::CodeKey;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Authorization decision recorded with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditDecision {
    /// The operation was permitted to run.
    Allow,
    /// The operation was refused before touching the store.
    Deny,
}

/// Ledger audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Operation label (for example `upsert` or `bulk_upsert`).
    pub operation: &'static str,
    /// Caller identity when the operation is caller-scoped.
    pub caller_id: Option<String>,
    /// Authorization decision.
    pub decision: AuditDecision,
    /// Outcome label (`ok` or an error kind).
    pub outcome: &'static str,
    /// Pseudonymized code key when one was derived.
    pub code_key: Option<CodeKey>,
    /// Rows submitted, for batch operations.
    pub rows: Option<usize>,
    /// Rows accepted, for batch operations.
    pub accepted: Option<usize>,
}

/// Inputs required to construct a ledger audit event.
#[derive(Debug, Clone)]
pub struct LedgerAuditEventParams {
    /// Operation label.
    pub operation: &'static str,
    /// Caller identity when known.
    pub caller_id: Option<CallerId>,
    /// Authorization decision.
    pub decision: AuditDecision,
    /// Outcome label.
    pub outcome: &'static str,
    /// Pseudonymized code key when one was derived.
    pub code_key: Option<CodeKey>,
    /// Rows submitted, for batch operations.
    pub rows: Option<usize>,
    /// Rows accepted, for batch operations.
    pub accepted: Option<usize>,
}

impl LedgerAuditEvent {
    /// Creates an audit event stamped with the current time.
    #[must_use]
    pub fn new(params: LedgerAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "ledger_audit",
            timestamp_ms,
            operation: params.operation,
            caller_id: params.caller_id.map(|caller| caller.as_str().to_string()),
            decision: params.decision,
            outcome: params.outcome,
            code_key: params.code_key,
            rows: params.rows,
            accepted: params.accepted,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for ledger events.
pub trait LedgerAuditSink: Send + Sync {
    /// Records an audit event.
    fn record(&self, event: &LedgerAuditEvent);
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink that logs JSON lines to stderr.
pub struct LedgerStderrAuditSink;

impl LedgerAuditSink for LedgerStderrAuditSink {
    fn record(&self, event: &LedgerAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct LedgerFileAuditSink {
    /// Output file guarded by a mutex.
    file: Mutex<File>,
}

impl LedgerFileAuditSink {
    /// Opens a file-backed audit sink in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl LedgerAuditSink for LedgerFileAuditSink {
    fn record(&self, event: &LedgerAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct LedgerNoopAuditSink;

impl LedgerAuditSink for LedgerNoopAuditSink {
    fn record(&self, _event: &LedgerAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
