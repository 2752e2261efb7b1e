// crates/score-ledger-core/src/core/access.rs
// ============================================================================
// Module: Score Ledger Access Gate
// Description: Flat admin/non-admin classification of callers.
// Purpose: Gate mutating operations behind an immutable allow-list.
// Dependencies: crate::core::identifiers, thiserror
// ============================================================================

//! ## Overview
//! The gate is built once at startup from configuration and never mutated.
//! Reads are open to any caller; every mutation must pass
//! [`AccessGate::require_privileged`]. Decisions are fail-closed: an empty
//! allow-list admits nobody.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::identifiers::CallerId;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Raised when a non-privileged caller invokes a privileged operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("caller is not authorized for {action}")]
pub struct AccessDenied {
    /// Operation label that was refused.
    pub action: &'static str,
}

// ============================================================================
// SECTION: Gate
// ============================================================================

/// Immutable set of privileged caller identities.
#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    /// Callers allowed to mutate scores.
    privileged: BTreeSet<CallerId>,
}

impl AccessGate {
    /// Builds a gate from the privileged caller identities.
    #[must_use]
    pub fn new(privileged: impl IntoIterator<Item = CallerId>) -> Self {
        Self {
            privileged: privileged.into_iter().filter(|id| !id.as_str().is_empty()).collect(),
        }
    }

    /// Returns true when `caller` may perform mutations.
    #[must_use]
    pub fn is_privileged(&self, caller: &CallerId) -> bool {
        self.privileged.contains(caller)
    }

    /// Fails unless `caller` is privileged.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied`] for non-privileged callers.
    pub fn require_privileged(
        &self,
        caller: &CallerId,
        action: &'static str,
    ) -> Result<(), AccessDenied> {
        if self.is_privileged(caller) {
            Ok(())
        } else {
            Err(AccessDenied {
                action,
            })
        }
    }

    /// Returns the number of privileged identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.privileged.len()
    }

    /// Returns true when no caller is privileged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.privileged.is_empty()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::AccessDenied;
    use super::AccessGate;
    use crate::core::identifiers::CallerId;

    #[test]
    fn membership_decides_privilege() {
        let gate = AccessGate::new([CallerId::new("42"), CallerId::new(" 7 ")]);
        assert!(gate.is_privileged(&CallerId::new("42")));
        assert!(gate.is_privileged(&CallerId::new("7")));
        assert!(!gate.is_privileged(&CallerId::new("8")));
        assert_eq!(gate.len(), 2);
    }

    #[test]
    fn empty_gate_denies_everyone() {
        let gate = AccessGate::new([CallerId::new("")]);
        assert!(gate.is_empty());
        assert_eq!(
            gate.require_privileged(&CallerId::new(""), "add"),
            Err(AccessDenied {
                action: "add"
            })
        );
    }
}
