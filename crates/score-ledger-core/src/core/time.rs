// crates/score-ledger-core/src/core/time.rs
// ============================================================================
// Module: Score Ledger Time Model
// Description: Wall-clock timestamps for score writes.
// Purpose: Provide a single UTC timestamp type with stable storage and display forms.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Record timestamps are stored as unix epoch milliseconds and rendered as
//! RFC 3339 UTC strings for display.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// UTC timestamp in unix epoch milliseconds.
///
/// # Invariants
/// - Ordering follows the millisecond value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Builds a timestamp from unix milliseconds.
    #[must_use]
    pub const fn from_unix_millis(value: i64) -> Self {
        Self(value)
    }

    /// Reads the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        Self(i64::try_from(now.as_millis()).unwrap_or(i64::MAX))
    }

    /// Returns the unix millisecond value.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }

    /// Returns the later of `self` and `previous`, keeping writes monotonic.
    #[must_use]
    pub fn not_before(self, previous: Self) -> Self {
        self.max(previous)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = i128::from(self.0) * 1_000_000;
        let rendered = OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .ok()
            .and_then(|moment| moment.format(&Rfc3339).ok());
        match rendered {
            Some(text) => f.write_str(&text),
            None => write!(f, "{}ms", self.0),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::Timestamp;

    #[test]
    fn displays_as_rfc3339_utc() {
        let stamp = Timestamp::from_unix_millis(1_700_000_000_123);
        assert_eq!(stamp.to_string(), "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn not_before_keeps_the_later_value() {
        let early = Timestamp::from_unix_millis(10);
        let late = Timestamp::from_unix_millis(20);
        assert_eq!(early.not_before(late), late);
        assert_eq!(late.not_before(early), late);
    }
}
