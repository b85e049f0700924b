use std::collections::HashMap;

use parking_lot::RwLock;

use crate::metrics::POINTS_AWARDED_TOTAL;

/// Per-student accumulated point totals.
///
/// Idempotency is inherited from the caller, not re-checked here: the
/// submission handler computes `points_earned` from the persisted attempt
/// history, so a retried request re-reads the already-solved state and
/// arrives with zero points. The ledger itself just adds.
pub struct RewardLedger {
    totals: RwLock<HashMap<String, i64>>,
}

impl RewardLedger {
    pub fn new() -> Self {
        Self {
            totals: RwLock::new(HashMap::new()),
        }
    }

    /// Adds `points` to the student's balance and returns the new total.
    pub fn grant(&self, student_id: &str, points: i64) -> i64 {
        let mut totals = self.totals.write();
        let total = totals.entry(student_id.to_string()).or_insert(0);
        *total += points;
        POINTS_AWARDED_TOTAL.inc_by(points.max(0) as u64);
        tracing::info!(student_id, points, total = *total, "points granted");
        *total
    }

    pub fn total(&self, student_id: &str) -> i64 {
        self.totals.read().get(student_id).copied().unwrap_or(0)
    }
}

impl Default for RewardLedger {
    fn default() -> Self {
        Self::new()
    }
}
