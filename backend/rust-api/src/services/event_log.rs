use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::models::answer::AnswerEvent;

/// Summary of a student's prior submissions for one exercise, derived from
/// the event log on every submission (never cached, so it cannot drift).
#[derive(Debug, Clone, Copy, Default)]
pub struct AttemptHistory {
    pub prior_attempts: u32,
    /// Correctness of the most recent prior submission, if any.
    pub last_result: Option<bool>,
    /// Whether any prior submission was correct: once true, the exercise is
    /// Solved and no further reward can fire.
    pub ever_correct: bool,
}

#[derive(Default)]
struct EventLogInner {
    events: Vec<Arc<AnswerEvent>>,
    by_exercise: HashMap<(String, String), Vec<usize>>,
}

/// Append-only log of answer events. Events are inserted in submission order
/// and never mutated or deleted; all wrong-answer and audit reads are
/// projections over this log.
pub struct EventLog {
    inner: RwLock<EventLogInner>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(EventLogInner::default()),
        }
    }

    pub fn append(&self, event: AnswerEvent) -> Arc<AnswerEvent> {
        let event = Arc::new(event);
        let mut inner = self.inner.write();
        let index = inner.events.len();
        inner
            .by_exercise
            .entry((event.student_id.clone(), event.exercise_id.clone()))
            .or_default()
            .push(index);
        inner.events.push(event.clone());
        event
    }

    pub fn attempt_history(&self, student_id: &str, exercise_id: &str) -> AttemptHistory {
        let inner = self.inner.read();
        let Some(indices) = inner
            .by_exercise
            .get(&(student_id.to_string(), exercise_id.to_string()))
        else {
            return AttemptHistory::default();
        };

        let last_result = indices.last().map(|&i| inner.events[i].is_correct);
        AttemptHistory {
            prior_attempts: indices.len() as u32,
            last_result,
            ever_correct: indices.iter().any(|&i| inner.events[i].is_correct),
        }
    }

    /// All events for one student, in submission order.
    pub fn events_for_student(&self, student_id: &str) -> Vec<Arc<AnswerEvent>> {
        let inner = self.inner.read();
        inner
            .events
            .iter()
            .filter(|e| e.student_id == student_id)
            .cloned()
            .collect()
    }

    /// All events for one (student, unit) pair, in submission order.
    pub fn events_for_unit(&self, student_id: &str, unit_id: &str) -> Vec<Arc<AnswerEvent>> {
        let inner = self.inner.read();
        inner
            .events
            .iter()
            .filter(|e| e.student_id == student_id && e.unit_id == unit_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
