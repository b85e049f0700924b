use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::metrics::WRONG_ANSWER_QUERIES_TOTAL;
use crate::models::answer::{AnswerEvent, WrongAnswerType};
use crate::models::wrong_answer::{WrongAnswerQuery, WrongAnswerSummary};
use crate::services::event_log::EventLog;
use crate::services::AppState;

/// Read-time projection over the event log: exercises whose most recent
/// submission is still incorrect. There is no second mutable table to keep
/// in sync; an exercise answered correctly later disappears on its own.
pub struct WrongAnswerTracker {
    events: Arc<EventLog>,
}

struct ExerciseErrors {
    unit_id: String,
    subject: String,
    last_is_correct: bool,
    error_count: u64,
    response_time_sum_ms: u64,
    response_time_samples: u64,
    error_types: BTreeSet<WrongAnswerType>,
    last_error_time: DateTime<Utc>,
}

impl WrongAnswerTracker {
    pub fn new(state: &AppState) -> Self {
        Self {
            events: state.events.clone(),
        }
    }

    pub fn wrong_answers(
        &self,
        student_id: &str,
        query: &WrongAnswerQuery,
    ) -> Vec<WrongAnswerSummary> {
        WRONG_ANSWER_QUERIES_TOTAL.inc();

        // BTreeMap keeps the output deterministic across identical logs.
        let mut groups: BTreeMap<String, ExerciseErrors> = BTreeMap::new();

        for event in self.events.events_for_student(student_id) {
            if !matches_query(&event, query) {
                continue;
            }

            let group = groups
                .entry(event.exercise_id.clone())
                .or_insert_with(|| ExerciseErrors {
                    unit_id: event.unit_id.clone(),
                    subject: event.subject.clone(),
                    last_is_correct: event.is_correct,
                    error_count: 0,
                    response_time_sum_ms: 0,
                    response_time_samples: 0,
                    error_types: BTreeSet::new(),
                    last_error_time: event.submit_time,
                });

            // Events arrive in submission order, so the last one wins.
            group.last_is_correct = event.is_correct;

            if event.is_wrong_answer {
                group.error_count += 1;
                group.last_error_time = event.submit_time;
                if let Some(ms) = event.response_time_ms {
                    group.response_time_sum_ms += ms;
                    group.response_time_samples += 1;
                }
                if let Some(wrong_type) = event.wrong_answer_type {
                    group.error_types.insert(wrong_type);
                }
            }
        }

        let mut summaries: Vec<WrongAnswerSummary> = groups
            .into_iter()
            .filter(|(_, group)| !group.last_is_correct && group.error_count > 0)
            .map(|(exercise_id, group)| WrongAnswerSummary {
                exercise_id,
                unit_id: group.unit_id,
                subject: group.subject,
                error_count: group.error_count,
                average_response_time_ms: if group.response_time_samples == 0 {
                    0.0
                } else {
                    group.response_time_sum_ms as f64 / group.response_time_samples as f64
                },
                error_types: group.error_types.into_iter().collect(),
                last_error_time: group.last_error_time,
            })
            .collect();

        // Most recently failed exercises first.
        summaries.sort_by(|a, b| b.last_error_time.cmp(&a.last_error_time));
        summaries
    }
}

fn matches_query(event: &AnswerEvent, query: &WrongAnswerQuery) -> bool {
    if let Some(subject) = &query.subject {
        if &event.subject != subject {
            return false;
        }
    }
    if let Some(unit_id) = &query.unit_id {
        if &event.unit_id != unit_id {
            return false;
        }
    }
    if let Some(exercise_type) = query.exercise_type {
        if event.user_answer.kind() != exercise_type {
            return false;
        }
    }
    true
}
