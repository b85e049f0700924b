mod common;

use std::sync::Arc;

use masteryhub_api::models::answer::{AnswerPayload, PracticeMode, SubmitAnswerRequest};
use masteryhub_api::models::progress::UnitProgress;
use masteryhub_api::services::mastery;
use masteryhub_api::services::submission_service::SubmissionService;
use masteryhub_api::services::AppState;

use common::create_test_state;

fn choice_request(exercise_id: &str, unit_id: &str, selected: &str) -> SubmitAnswerRequest {
    SubmitAnswerRequest {
        exercise_id: exercise_id.to_string(),
        unit_id: unit_id.to_string(),
        user_answer: AnswerPayload::Choice {
            selected: selected.to_string(),
        },
        is_correct: None,
        response_time_ms: Some(1_500),
        session_id: "session-1".to_string(),
        practice_mode: PracticeMode::Normal,
        hints_used: None,
        confidence: None,
    }
}

fn replay_unit(state: &Arc<AppState>, student_id: &str, unit_id: &str) -> UnitProgress {
    let events = state.events.events_for_unit(student_id, unit_id);
    mastery::replay(student_id, unit_id, events.iter().map(Arc::as_ref))
}

fn assert_same_aggregate(replayed: &UnitProgress, stored: &UnitProgress) {
    assert_eq!(replayed.total_answer_count, stored.total_answer_count);
    assert_eq!(replayed.correct_count, stored.correct_count);
    assert_eq!(replayed.incorrect_count, stored.incorrect_count);
    assert_eq!(replayed.completed_exercises, stored.completed_exercises);
    assert_eq!(replayed.total_time_spent_ms, stored.total_time_spent_ms);
    assert!(
        (replayed.average_response_time_ms - stored.average_response_time_ms).abs() < 1e-9,
        "average diverged: {} vs {}",
        replayed.average_response_time_ms,
        stored.average_response_time_ms
    );
    assert!(
        (replayed.mastery_level - stored.mastery_level).abs() < 1e-9,
        "mastery diverged: {} vs {}",
        replayed.mastery_level,
        stored.mastery_level
    );
    assert_eq!(replayed.last_practice_time, stored.last_practice_time);
}

#[tokio::test]
async fn replaying_the_event_log_reproduces_the_stored_aggregate() {
    let state = create_test_state();
    let service = SubmissionService::new(&state);

    // A mix of wrong answers, retries, and first-attempt solves.
    let submissions = [
        ("ex-1", "C"),
        ("ex-1", "C"),
        ("ex-1", "B"),
        ("ex-4", "A"),
        ("ex-4", "B"),
    ];
    for (exercise_id, selected) in submissions {
        service
            .submit_answer("student-1", &choice_request(exercise_id, "unit-1", selected))
            .await
            .unwrap();
    }

    let stored = state.progress.get("student-1", "unit-1").unwrap();
    let replayed = replay_unit(&state, "student-1", "unit-1");
    assert_same_aggregate(&replayed, &stored);

    // Sanity on the shape of the run itself.
    assert_eq!(stored.total_answer_count, 5);
    assert_eq!(stored.correct_count, 2);
    assert_eq!(stored.completed_exercises, 2);
}

#[tokio::test]
async fn replay_is_idempotent() {
    let state = create_test_state();
    let service = SubmissionService::new(&state);

    for (exercise_id, selected) in [("ex-1", "B"), ("ex-4", "C"), ("ex-4", "A")] {
        service
            .submit_answer("student-1", &choice_request(exercise_id, "unit-1", selected))
            .await
            .unwrap();
    }

    let first = replay_unit(&state, "student-1", "unit-1");
    let second = replay_unit(&state, "student-1", "unit-1");
    assert_same_aggregate(&first, &second);
}

#[tokio::test]
async fn replay_keeps_units_and_students_apart() {
    let state = create_test_state();
    let service = SubmissionService::new(&state);

    service
        .submit_answer("student-1", &choice_request("ex-1", "unit-1", "B"))
        .await
        .unwrap();
    service
        .submit_answer("student-1", &choice_request("ex-6", "unit-2", "A"))
        .await
        .unwrap();
    service
        .submit_answer("student-2", &choice_request("ex-1", "unit-1", "C"))
        .await
        .unwrap();

    let unit_1 = replay_unit(&state, "student-1", "unit-1");
    assert_eq!(unit_1.total_answer_count, 1);
    assert_eq!(unit_1.correct_count, 1);

    let unit_2 = replay_unit(&state, "student-1", "unit-2");
    assert_eq!(unit_2.total_answer_count, 1);
    assert_eq!(unit_2.correct_count, 1);

    let other = replay_unit(&state, "student-2", "unit-1");
    assert_eq!(other.total_answer_count, 1);
    assert_eq!(other.incorrect_count, 1);
}
