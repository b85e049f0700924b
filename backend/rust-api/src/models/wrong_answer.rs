use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::answer::WrongAnswerType;
use super::catalog::ExerciseKind;

/// Optional filters for the wrong-answer projection.
#[derive(Debug, Default, Deserialize)]
pub struct WrongAnswerQuery {
    pub subject: Option<String>,
    pub unit_id: Option<String>,
    pub exercise_type: Option<ExerciseKind>,
}

/// One exercise the student still has wrong: the most recent submission for
/// it was incorrect.
#[derive(Debug, Serialize, Deserialize)]
pub struct WrongAnswerSummary {
    pub exercise_id: String,
    pub unit_id: String,
    pub subject: String,
    pub error_count: u64,
    pub average_response_time_ms: f64,
    pub error_types: Vec<WrongAnswerType>,
    pub last_error_time: DateTime<Utc>,
}
