use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::EngineError;
use crate::metrics::{ANSWERS_SUBMITTED_TOTAL, VISITS_RECORDED_TOTAL};
use crate::models::answer::{
    classify_wrong_answer, AnswerEvent, RecordVisitResponse, SubmitAnswerRequest,
    SubmitAnswerResponse, VisitKind,
};
use crate::services::catalog::{CatalogReader, StudentDirectory};
use crate::services::event_log::EventLog;
use crate::services::mastery;
use crate::services::progress_store::ProgressStore;
use crate::services::reward_service::RewardLedger;
use crate::services::AppState;
use crate::utils::locks::KeyedLocks;
use crate::utils::retry::{retry_async_with_config, RetryConfig};

/// Handles a single answer submission end to end: catalog resolution, payload
/// validation, attempt derivation, scoring, the solved-transition check,
/// event append, aggregate update and reward grant.
pub struct SubmissionService {
    catalog: Arc<dyn CatalogReader>,
    directory: Arc<dyn StudentDirectory>,
    events: Arc<EventLog>,
    progress: Arc<ProgressStore>,
    rewards: Arc<RewardLedger>,
    attempt_locks: Arc<KeyedLocks<(String, String)>>,
}

impl SubmissionService {
    pub fn new(state: &AppState) -> Self {
        Self {
            catalog: state.catalog.clone(),
            directory: state.directory.clone(),
            events: state.events.clone(),
            progress: state.progress.clone(),
            rewards: state.rewards.clone(),
            attempt_locks: state.attempt_locks.clone(),
        }
    }

    pub async fn submit_answer(
        &self,
        student_id: &str,
        req: &SubmitAnswerRequest,
    ) -> Result<SubmitAnswerResponse, EngineError> {
        tracing::info!(
            student_id,
            exercise_id = %req.exercise_id,
            unit_id = %req.unit_id,
            "processing answer submission"
        );

        if !self.directory.student_exists(student_id).await? {
            return Err(EngineError::not_found(format!("student {student_id}")));
        }

        let exercise = self.catalog.get_exercise(&req.exercise_id).await?;
        if exercise.unit_id != req.unit_id {
            return Err(EngineError::validation(format!(
                "exercise {} does not belong to unit {}",
                req.exercise_id, req.unit_id
            )));
        }
        // Resolving the unit also guards against dangling unit ids.
        self.catalog.get_unit(&req.unit_id).await?;

        if req.user_answer.kind() != exercise.kind {
            return Err(EngineError::validation(format!(
                "answer payload is {:?} but exercise {} expects {:?}",
                req.user_answer.kind(),
                exercise.id,
                exercise.kind
            )));
        }

        let is_correct = match req.is_correct {
            Some(graded) => graded,
            None => req.user_answer.matches(&exercise.correct_answer),
        };

        // Attempt derivation and the event append must happen as one unit per
        // (student, exercise) key, or concurrent resubmissions could observe
        // the same prior count and double-award the solved transition.
        let attempt_key = (student_id.to_string(), req.exercise_id.clone());
        let event = {
            let _guard = self.attempt_locks.acquire(attempt_key).await;

            let history = self.events.attempt_history(student_id, &req.exercise_id);
            let attempt_number = history.prior_attempts + 1;
            let is_first_attempt = attempt_number == 1;
            // Solved transition: this event makes the exercise correct for
            // the first time ever. Once solved, resubmissions never pay out
            // again, including correct ones after a later incorrect retry.
            let points_earned = if is_correct && !history.ever_correct { 1 } else { 0 };
            let score = mastery::score_for(is_correct, attempt_number);
            let wrong_answer_type = (!is_correct)
                .then(|| classify_wrong_answer(&req.user_answer, req.response_time_ms));

            self.events.append(AnswerEvent {
                id: Uuid::new_v4().to_string(),
                student_id: student_id.to_string(),
                exercise_id: req.exercise_id.clone(),
                unit_id: req.unit_id.clone(),
                subject: exercise.subject.clone(),
                is_correct,
                user_answer: req.user_answer.clone(),
                correct_answer: exercise.correct_answer.clone(),
                score,
                response_time_ms: req.response_time_ms,
                submit_time: Utc::now(),
                attempt_number,
                is_first_attempt,
                previous_result: history.last_result,
                session_id: req.session_id.clone(),
                practice_mode: req.practice_mode,
                hints_used: req.hints_used,
                confidence: req.confidence,
                is_wrong_answer: !is_correct,
                wrong_answer_type,
                points_earned,
            })
        };

        // Optimistic aggregate update; conflicts with concurrent writers on
        // the same (student, unit) resolve through bounded retry.
        let progress = retry_async_with_config(RetryConfig::conflicts(), || async {
            self.progress.try_apply_answer(
                student_id,
                &event.unit_id,
                event.is_correct,
                event.response_time_ms,
                event.points_earned > 0,
                event.submit_time,
            )
        })
        .await?;

        if event.points_earned > 0 {
            self.rewards.grant(student_id, event.points_earned);
        }

        let correct_label = if event.is_correct { "true" } else { "false" };
        ANSWERS_SUBMITTED_TOTAL
            .with_label_values(&[correct_label])
            .inc();

        tracing::info!(
            student_id,
            exercise_id = %event.exercise_id,
            attempt = event.attempt_number,
            correct = event.is_correct,
            points = event.points_earned,
            mastery = progress.mastery_level,
            "answer processed"
        );

        Ok(SubmitAnswerResponse {
            record_id: event.id.clone(),
            is_correct: event.is_correct,
            score: event.score,
            points_earned: event.points_earned,
            attempt_number: event.attempt_number,
            mastery_level: progress.mastery_level,
        })
    }

    /// Records a study/practice page visit; these feed the volume terms of
    /// the mastery formula but live outside the answer-submission path.
    pub async fn record_visit(
        &self,
        student_id: &str,
        unit_id: &str,
        kind: VisitKind,
    ) -> Result<RecordVisitResponse, EngineError> {
        if !self.directory.student_exists(student_id).await? {
            return Err(EngineError::not_found(format!("student {student_id}")));
        }
        self.catalog.get_unit(unit_id).await?;

        let progress = retry_async_with_config(RetryConfig::conflicts(), || async {
            self.progress
                .try_record_visit(student_id, unit_id, kind, Utc::now())
        })
        .await?;

        let kind_label = match kind {
            VisitKind::Study => "study",
            VisitKind::Practice => "practice",
        };
        VISITS_RECORDED_TOTAL.with_label_values(&[kind_label]).inc();

        Ok(RecordVisitResponse {
            unit_id: unit_id.to_string(),
            study_count: progress.study_count,
            practice_count: progress.practice_count,
            mastery_level: progress.mastery_level,
        })
    }
}
