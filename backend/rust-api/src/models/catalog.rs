use serde::{Deserialize, Serialize};

use super::answer::AnswerPayload;

/// Exercise kinds the engine knows how to validate and grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    SingleChoice,
    FillBlank,
    Matching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Exercise metadata as resolved from the catalog collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub unit_id: String,
    pub subject: String,
    pub kind: ExerciseKind,
    pub correct_answer: AnswerPayload,
    pub difficulty: Difficulty,
}

/// Unit metadata as resolved from the catalog collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub total_exercise_count: u64,
}
