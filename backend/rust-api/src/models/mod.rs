pub mod answer;
pub mod catalog;
pub mod progress;
pub mod wrong_answer;

pub use answer::{
    AnswerEvent, AnswerPayload, PracticeMode, RecordVisitRequest, RecordVisitResponse,
    SubmitAnswerRequest, SubmitAnswerResponse, VisitKind, WrongAnswerType,
};
pub use catalog::{Difficulty, Exercise, ExerciseKind, Unit};
pub use progress::{
    BatchProgressRequest, PointsResponse, UnitProgress, UnitProgressView,
};
pub use wrong_answer::{WrongAnswerQuery, WrongAnswerSummary};
