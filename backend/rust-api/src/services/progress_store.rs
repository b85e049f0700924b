use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::error::EngineError;
use crate::models::progress::UnitProgress;
use crate::models::VisitKind;
use crate::services::mastery;

struct VersionedProgress {
    version: u64,
    progress: UnitProgress,
}

/// One mutable aggregate per (student, unit), created lazily on first use.
///
/// Writers follow an optimistic read-modify-write: snapshot under the read
/// lock, mutate the copy, then commit under the write lock only if nobody
/// committed in between. A lost race yields `EngineError::Conflict`, which
/// callers resolve with a bounded retry; it never reaches an API response.
/// Different keys share nothing but the map itself, so they do not contend
/// beyond the brief lock acquisitions.
pub struct ProgressStore {
    inner: RwLock<HashMap<(String, String), VersionedProgress>>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Current (version, aggregate) for the key; version 0 with a fresh
    /// aggregate when the key does not exist yet.
    fn snapshot(&self, student_id: &str, unit_id: &str) -> (u64, UnitProgress) {
        let map = self.inner.read();
        match map.get(&(student_id.to_string(), unit_id.to_string())) {
            Some(entry) => (entry.version, entry.progress.clone()),
            None => (0, UnitProgress::new(student_id, unit_id)),
        }
    }

    fn commit(
        &self,
        student_id: &str,
        unit_id: &str,
        expected_version: u64,
        updated: UnitProgress,
    ) -> Result<(), EngineError> {
        let key = (student_id.to_string(), unit_id.to_string());
        let mut map = self.inner.write();
        match map.get_mut(&key) {
            Some(entry) => {
                if entry.version != expected_version {
                    return Err(EngineError::Conflict);
                }
                entry.version += 1;
                entry.progress = updated;
            }
            None => {
                if expected_version != 0 {
                    return Err(EngineError::Conflict);
                }
                map.insert(
                    key,
                    VersionedProgress {
                        version: 1,
                        progress: updated,
                    },
                );
            }
        }
        Ok(())
    }

    /// One optimistic attempt at applying an answer event. Returns the
    /// post-update aggregate on success.
    pub fn try_apply_answer(
        &self,
        student_id: &str,
        unit_id: &str,
        is_correct: bool,
        response_time_ms: Option<u64>,
        solved_transition: bool,
        now: DateTime<Utc>,
    ) -> Result<UnitProgress, EngineError> {
        let (version, mut progress) = self.snapshot(student_id, unit_id);
        mastery::apply_answer(&mut progress, is_correct, response_time_ms, solved_transition, now);
        self.commit(student_id, unit_id, version, progress.clone())?;
        Ok(progress)
    }

    /// One optimistic attempt at recording a study/practice page visit.
    pub fn try_record_visit(
        &self,
        student_id: &str,
        unit_id: &str,
        kind: VisitKind,
        now: DateTime<Utc>,
    ) -> Result<UnitProgress, EngineError> {
        let (version, mut progress) = self.snapshot(student_id, unit_id);
        mastery::apply_visit(&mut progress, kind, now);
        self.commit(student_id, unit_id, version, progress.clone())?;
        Ok(progress)
    }

    pub fn get(&self, student_id: &str, unit_id: &str) -> Option<UnitProgress> {
        let map = self.inner.read();
        map.get(&(student_id.to_string(), unit_id.to_string()))
            .map(|entry| entry.progress.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ProgressStore {
    fn default() -> Self {
        Self::new()
    }
}
