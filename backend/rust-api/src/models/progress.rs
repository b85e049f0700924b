use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Rolling aggregate for one (student, unit) pair. Lazily created on the
/// first answer or page visit, updated on every subsequent event, never
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitProgress {
    pub student_id: String,
    pub unit_id: String,
    pub total_answer_count: u64,
    pub correct_count: u64,
    pub incorrect_count: u64,
    pub study_count: u64,
    pub practice_count: u64,
    /// Distinct exercises solved at least once; incremented exactly on
    /// solved transitions.
    pub completed_exercises: u64,
    pub total_time_spent_ms: u64,
    /// Incremental mean over answers that carried a response time.
    pub average_response_time_ms: f64,
    pub mastery_level: f64,
    pub last_study_time: Option<DateTime<Utc>>,
    pub last_practice_time: Option<DateTime<Utc>>,
}

impl UnitProgress {
    pub fn new(student_id: &str, unit_id: &str) -> Self {
        Self {
            student_id: student_id.to_string(),
            unit_id: unit_id.to_string(),
            total_answer_count: 0,
            correct_count: 0,
            incorrect_count: 0,
            study_count: 0,
            practice_count: 0,
            completed_exercises: 0,
            total_time_spent_ms: 0,
            average_response_time_ms: 0.0,
            mastery_level: 0.0,
            last_study_time: None,
            last_practice_time: None,
        }
    }
}

/// Star rating policy shared with the surrounding platform: three stars at
/// 80% completion, two at 60%, one for any progress at all.
pub fn stars_for_rate(completion_rate: f64) -> u8 {
    if completion_rate >= 0.8 {
        3
    } else if completion_rate >= 0.6 {
        2
    } else if completion_rate > 0.0 {
        1
    } else {
        0
    }
}

/// Read-side view of unit progress returned by the single and batch queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitProgressView {
    pub unit_id: String,
    pub total_exercises: u64,
    pub completed_exercises: u64,
    pub completion_rate: f64,
    pub stars: u8,
    pub mastery_level: f64,
    pub study_count: u64,
    pub practice_count: u64,
    pub correct_count: u64,
    pub incorrect_count: u64,
    pub total_time_spent_ms: u64,
    pub average_response_time_ms: f64,
    pub unlock_next: bool,
    pub completed: bool,
}

impl UnitProgressView {
    /// Default zero-progress value used for units without an aggregate and as
    /// the fallback entry when a batch lookup fails or times out.
    pub fn empty(unit_id: &str) -> Self {
        Self {
            unit_id: unit_id.to_string(),
            total_exercises: 0,
            completed_exercises: 0,
            completion_rate: 0.0,
            stars: 0,
            mastery_level: 0.0,
            study_count: 0,
            practice_count: 0,
            correct_count: 0,
            incorrect_count: 0,
            total_time_spent_ms: 0,
            average_response_time_ms: 0.0,
            unlock_next: false,
            completed: false,
        }
    }

    pub fn from_progress(progress: &UnitProgress, total_exercises: u64) -> Self {
        let completion_rate = if total_exercises == 0 {
            0.0
        } else {
            progress.completed_exercises as f64 / total_exercises as f64
        };
        let stars = stars_for_rate(completion_rate);
        Self {
            unit_id: progress.unit_id.clone(),
            total_exercises,
            completed_exercises: progress.completed_exercises,
            completion_rate,
            stars,
            mastery_level: progress.mastery_level,
            study_count: progress.study_count,
            practice_count: progress.practice_count,
            correct_count: progress.correct_count,
            incorrect_count: progress.incorrect_count,
            total_time_spent_ms: progress.total_time_spent_ms,
            average_response_time_ms: progress.average_response_time_ms,
            unlock_next: stars == 3,
            completed: total_exercises > 0 && progress.completed_exercises >= total_exercises,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct BatchProgressRequest {
    #[validate(length(min = 1, max = 500, message = "unit_ids must hold 1..=500 entries"))]
    pub unit_ids: Vec<String>,
    /// Overall deadline for the fan-out; capped by server configuration.
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PointsResponse {
    pub student_id: String,
    pub total_points: i64,
}
