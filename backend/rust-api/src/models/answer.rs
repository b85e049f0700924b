use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::catalog::ExerciseKind;

/// Responses slower than this are classified as slow regardless of content.
const SLOW_RESPONSE_THRESHOLD_MS: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeMode {
    #[default]
    Normal,
    Review,
    WrongRedo,
    Test,
    UnlockTest,
}

/// One left/right pairing in a matching exercise.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchPair {
    pub left: String,
    pub right: String,
}

/// Answer content, shaped per exercise kind. The variant is validated against
/// the exercise's declared kind at the ingestion boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerPayload {
    Choice { selected: String },
    FillBlank { text: String },
    Matching { pairs: Vec<MatchPair> },
}

impl AnswerPayload {
    pub fn kind(&self) -> ExerciseKind {
        match self {
            AnswerPayload::Choice { .. } => ExerciseKind::SingleChoice,
            AnswerPayload::FillBlank { .. } => ExerciseKind::FillBlank,
            AnswerPayload::Matching { .. } => ExerciseKind::Matching,
        }
    }

    /// Compares this answer against the catalog's correct answer.
    ///
    /// Fill-in answers compare trimmed; matching answers compare as a set of
    /// pairs, ignoring submission order. Mismatched variants never match.
    pub fn matches(&self, correct: &AnswerPayload) -> bool {
        match (self, correct) {
            (AnswerPayload::Choice { selected: a }, AnswerPayload::Choice { selected: b }) => {
                a == b
            }
            (AnswerPayload::FillBlank { text: a }, AnswerPayload::FillBlank { text: b }) => {
                a.trim() == b.trim()
            }
            (AnswerPayload::Matching { pairs: a }, AnswerPayload::Matching { pairs: b }) => {
                if a.len() != b.len() {
                    return false;
                }
                let mut a_sorted = a.clone();
                let mut b_sorted = b.clone();
                a_sorted.sort();
                b_sorted.sort();
                a_sorted == b_sorted
            }
            _ => false,
        }
    }
}

/// Classification of an incorrect submission, derived at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrongAnswerType {
    Blank,
    WrongOption,
    WrongText,
    WrongPairing,
    SlowResponse,
}

/// Classifies the wrong answer by response time first, then by content shape.
pub fn classify_wrong_answer(
    payload: &AnswerPayload,
    response_time_ms: Option<u64>,
) -> WrongAnswerType {
    if response_time_ms.is_some_and(|ms| ms > SLOW_RESPONSE_THRESHOLD_MS) {
        return WrongAnswerType::SlowResponse;
    }
    match payload {
        AnswerPayload::Choice { .. } => WrongAnswerType::WrongOption,
        AnswerPayload::FillBlank { text } if text.trim().is_empty() => WrongAnswerType::Blank,
        AnswerPayload::FillBlank { .. } => WrongAnswerType::WrongText,
        AnswerPayload::Matching { .. } => WrongAnswerType::WrongPairing,
    }
}

/// Immutable record of a single answer submission. Created exactly once per
/// submission and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerEvent {
    pub id: String,
    pub student_id: String,
    pub exercise_id: String,
    pub unit_id: String,
    pub subject: String,
    pub is_correct: bool,
    pub user_answer: AnswerPayload,
    /// Snapshot of the catalog's correct answer at submission time.
    pub correct_answer: AnswerPayload,
    pub score: i32,
    pub response_time_ms: Option<u64>,
    pub submit_time: DateTime<Utc>,
    pub attempt_number: u32,
    pub is_first_attempt: bool,
    pub previous_result: Option<bool>,
    pub session_id: String,
    pub practice_mode: PracticeMode,
    pub hints_used: Option<u32>,
    pub confidence: Option<f32>,
    pub is_wrong_answer: bool,
    pub wrong_answer_type: Option<WrongAnswerType>,
    pub points_earned: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1, message = "exercise_id is required"))]
    pub exercise_id: String,
    #[validate(length(min = 1, message = "unit_id is required"))]
    pub unit_id: String,
    pub user_answer: AnswerPayload,
    /// Upstream-graded correctness override; when absent the catalog
    /// comparison decides.
    pub is_correct: Option<bool>,
    #[validate(range(max = 3_600_000, message = "response_time_ms out of range"))]
    pub response_time_ms: Option<u64>,
    #[validate(length(min = 1, message = "session_id is required"))]
    pub session_id: String,
    #[serde(default)]
    pub practice_mode: PracticeMode,
    pub hints_used: Option<u32>,
    #[validate(range(min = 0.0, max = 1.0, message = "confidence must be within [0,1]"))]
    pub confidence: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    pub record_id: String,
    pub is_correct: bool,
    pub score: i32,
    pub points_earned: i64,
    pub attempt_number: u32,
    /// Mastery level of the unit after this event was applied.
    pub mastery_level: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitKind {
    Study,
    Practice,
}

#[derive(Debug, Deserialize)]
pub struct RecordVisitRequest {
    pub kind: VisitKind,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordVisitResponse {
    pub unit_id: String,
    pub study_count: u64,
    pub practice_count: u64,
    pub mastery_level: f64,
}
