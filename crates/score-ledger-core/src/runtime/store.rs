// crates/score-ledger-core/src/runtime/store.rs
// ============================================================================
// Module: Score Ledger In-Memory Store
// Description: Simple in-memory score store for tests and demos.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of [`ScoreStore`] for
//! tests and local demos. It is not durable and not intended for production
//! use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::CodeKey;
use crate::core::ScoreEntry;
use crate::core::SubjectName;
use crate::core::Timestamp;
use crate::interfaces::ScoreStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Stored value for one `(code_key, subject)` pair.
#[derive(Debug, Clone, Copy)]
struct StoredScore {
    /// Latest score.
    score: f64,
    /// Time of the last write.
    updated_at: Timestamp,
}

/// Record map keyed by code key, then subject.
type RecordMap = BTreeMap<CodeKey, BTreeMap<SubjectName, StoredScore>>;

/// In-memory score store for tests and demos.
#[derive(Debug, Default, Clone)]
pub struct InMemoryScoreStore {
    /// Record map protected by a mutex.
    records: Arc<Mutex<RecordMap>>,
}

impl InMemoryScoreStore {
    /// Creates an empty in-memory score store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Locks the record map.
    fn guard(&self) -> Result<MutexGuard<'_, RecordMap>, StoreError> {
        self.records.lock().map_err(|_| StoreError::Store("score store mutex poisoned".to_string()))
    }
}

impl ScoreStore for InMemoryScoreStore {
    fn upsert(
        &self,
        code_key: &CodeKey,
        subject: &SubjectName,
        score: f64,
    ) -> Result<Timestamp, StoreError> {
        if !score.is_finite() {
            return Err(StoreError::Invalid("score must be finite".to_string()));
        }
        let mut guard = self.guard()?;
        let subjects = guard.entry(code_key.clone()).or_default();
        let now = Timestamp::now();
        let updated_at = subjects
            .get(subject)
            .map_or(now, |previous| now.not_before(previous.updated_at));
        subjects.insert(
            subject.clone(),
            StoredScore {
                score,
                updated_at,
            },
        );
        drop(guard);
        Ok(updated_at)
    }

    fn delete(&self, code_key: &CodeKey, subject: &SubjectName) -> Result<bool, StoreError> {
        let mut guard = self.guard()?;
        let Some(subjects) = guard.get_mut(code_key) else {
            return Ok(false);
        };
        let removed = subjects.remove(subject).is_some();
        if subjects.is_empty() {
            guard.remove(code_key);
        }
        drop(guard);
        Ok(removed)
    }

    fn delete_all(&self, code_key: &CodeKey) -> Result<u64, StoreError> {
        let removed = self.guard()?.remove(code_key).map_or(0, |subjects| subjects.len());
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }

    fn lookup(&self, code_key: &CodeKey) -> Result<Vec<ScoreEntry>, StoreError> {
        let guard = self.guard()?;
        let entries = guard
            .get(code_key)
            .map(|subjects| {
                subjects
                    .iter()
                    .map(|(subject, stored)| ScoreEntry {
                        subject: subject.clone(),
                        score: stored.score,
                        updated_at: stored.updated_at,
                    })
                    .collect()
            })
            .unwrap_or_default();
        drop(guard);
        Ok(entries)
    }

    fn lookup_one(
        &self,
        code_key: &CodeKey,
        subject: &SubjectName,
    ) -> Result<Option<ScoreEntry>, StoreError> {
        let guard = self.guard()?;
        let entry = guard.get(code_key).and_then(|subjects| subjects.get(subject)).map(|stored| {
            ScoreEntry {
                subject: subject.clone(),
                score: stored.score,
                updated_at: stored.updated_at,
            }
        });
        drop(guard);
        Ok(entry)
    }

    fn list_keys(&self, limit: usize) -> Result<Vec<CodeKey>, StoreError> {
        Ok(self.guard()?.keys().take(limit).cloned().collect())
    }

    fn count(&self) -> Result<u64, StoreError> {
        let total: usize = self.guard()?.values().map(BTreeMap::len).sum();
        Ok(u64::try_from(total).unwrap_or(u64::MAX))
    }
}
