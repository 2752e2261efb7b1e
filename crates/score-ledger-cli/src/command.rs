// crates/score-ledger-cli/src/command.rs
// ============================================================================
// Module: Chat Command Parsing
// Description: Splits chat-style message text into a routed command.
// Purpose: Give the CLI the same command surface as the chat front end.
// Dependencies: score-ledger-core
// ============================================================================

//! ## Overview
//! A message is either a slash command (`/add`, `/remove_all`, ...) followed by
//! its payload, or plain text treated as a lookup. Command names are matched
//! case-insensitively and a `@botname` suffix is ignored. Payload tokens are
//! split on whitespace, `|`, and `:`, the same separators the reconciler uses.

// ============================================================================
// SECTION: Imports
// ============================================================================

use score_ledger_core::tokenize_fields;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A routed chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// `/start` or `/help`.
    Help,
    /// `/add` or `/edit` with `<code> <subject..> <score>`.
    Upsert {
        /// Payload tokens.
        args: Vec<String>,
    },
    /// `/remove` with `<code> <subject..>`.
    Remove {
        /// Payload tokens.
        args: Vec<String>,
    },
    /// `/remove_all` with `<code>`.
    RemoveAll {
        /// Payload tokens.
        args: Vec<String>,
    },
    /// `/list_codes`.
    ListCodes,
    /// `/add_bulk` with one row per following line.
    Bulk {
        /// Raw payload text, line structure preserved.
        payload: String,
    },
    /// Plain text: `<code>` or `<code> <subject..>`.
    Lookup {
        /// Message tokens.
        args: Vec<String>,
    },
    /// A slash command this surface does not know.
    Unknown {
        /// Command name as sent, without the `@botname` suffix.
        name: String,
    },
}

impl ChatCommand {
    /// Routes one message. Returns `None` for blank text.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let Some(rest) = text.strip_prefix('/') else {
            return Some(Self::Lookup {
                args: tokenize_fields(text),
            });
        };
        let split = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (head, payload) = rest.split_at(split);
        let name = head.split('@').next().unwrap_or(head);
        let payload = payload.trim();
        let command = match name.to_ascii_lowercase().as_str() {
            "start" | "help" => Self::Help,
            "add" | "edit" => Self::Upsert {
                args: tokenize_fields(payload),
            },
            "remove" => Self::Remove {
                args: tokenize_fields(payload),
            },
            "remove_all" => Self::RemoveAll {
                args: tokenize_fields(payload),
            },
            "list_codes" => Self::ListCodes,
            "add_bulk" => Self::Bulk {
                payload: payload.to_string(),
            },
            _ => Self::Unknown {
                name: format!("/{name}"),
            },
        };
        Some(command)
    }

    /// Returns the ledger operation a privileged command maps to.
    #[must_use]
    pub const fn privileged_operation(&self) -> Option<&'static str> {
        match self {
            Self::Upsert {
                ..
            } => Some("upsert"),
            Self::Remove {
                ..
            } => Some("remove"),
            Self::RemoveAll {
                ..
            } => Some("remove_all"),
            Self::ListCodes => Some("list_codes"),
            Self::Bulk {
                ..
            } => Some("bulk_upsert"),
            Self::Help
            | Self::Lookup {
                ..
            }
            | Self::Unknown {
                ..
            } => None,
        }
    }
}

/// Splits `<code> <subject..> <score>` tokens into their parts.
///
/// Returns `None` when fewer than three tokens are present.
#[must_use]
pub fn split_upsert_args(args: &[String]) -> Option<(&str, String, &str)> {
    match args {
        [code, subject @ .., score] if !subject.is_empty() => {
            Some((code.as_str(), subject.join(" "), score.as_str()))
        }
        _ => None,
    }
}

/// Splits `<code> <subject..>` tokens into code and optional subject.
#[must_use]
pub fn split_code_subject(args: &[String]) -> Option<(&str, Option<String>)> {
    match args {
        [] => None,
        [code] => Some((code.as_str(), None)),
        [code, subject @ ..] => Some((code.as_str(), Some(subject.join(" ")))),
    }
}
