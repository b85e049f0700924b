mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{choice_json, create_test_app, get_json, post_json, submit_body};

#[tokio::test]
async fn unit_without_events_reports_zero_progress_with_catalog_total() {
    let (app, _state) = create_test_app();

    let (status, body) = get_json(
        &app,
        "/api/v1/students/student-1/units/unit-1/progress",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unit_id"], "unit-1");
    assert_eq!(body["total_exercises"], 5);
    assert_eq!(body["completed_exercises"], 0);
    assert_eq!(body["completion_rate"], 0.0);
    assert_eq!(body["stars"], 0);
    assert_eq!(body["mastery_level"], 0.0);
    assert_eq!(body["unlock_next"], false);
    assert_eq!(body["completed"], false);
}

#[tokio::test]
async fn unknown_unit_is_not_found() {
    let (app, _state) = create_test_app();

    let (status, _) = get_json(
        &app,
        "/api/v1/students/student-1/units/unit-404/progress",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn visits_move_the_mastery_volume_terms() {
    let (app, _state) = create_test_app();
    let uri = "/api/v1/students/student-1/units/unit-1/visits";

    let (status, body) = post_json(&app, uri, json!({ "kind": "study" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["study_count"], 1);
    assert_eq!(body["practice_count"], 0);
    // one study visit: min(1, 1/5) * 0.2 = 0.04
    assert!((body["mastery_level"].as_f64().unwrap() - 0.04).abs() < 1e-9);

    let (status, body) = post_json(&app, uri, json!({ "kind": "practice" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["practice_count"], 1);
    // plus one practice visit: min(1, 1/10) * 0.2 = 0.02
    assert!((body["mastery_level"].as_f64().unwrap() - 0.06).abs() < 1e-9);

    let (_, view) = get_json(
        &app,
        "/api/v1/students/student-1/units/unit-1/progress",
    )
    .await;
    assert_eq!(view["study_count"], 1);
    assert_eq!(view["practice_count"], 1);
}

#[tokio::test]
async fn visit_to_unknown_unit_is_not_found() {
    let (app, _state) = create_test_app();

    let (status, _) = post_json(
        &app,
        "/api/v1/students/student-1/units/unit-404/visits",
        json!({ "kind": "study" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stars_and_unlock_follow_completion_rate() {
    let (app, _state) = create_test_app();
    let answers_uri = "/api/v1/students/student-1/answers";
    let progress_uri = "/api/v1/students/student-1/units/unit-2/progress";

    // Solve 3 of 5 exercises in unit-2: rate 0.6 earns two stars, no unlock.
    for exercise_id in ["ex-6", "ex-7", "ex-8"] {
        let (status, body) =
            post_json(&app, answers_uri, submit_body(exercise_id, "unit-2", choice_json("A"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["points_earned"], 1);
    }

    let (_, view) = get_json(&app, progress_uri).await;
    assert_eq!(view["completed_exercises"], 3);
    assert_eq!(view["stars"], 2);
    assert_eq!(view["unlock_next"], false);

    // A fourth solve reaches 0.8: three stars and the unlock flag.
    let (_, body) =
        post_json(&app, answers_uri, submit_body("ex-9", "unit-2", choice_json("A"))).await;
    assert_eq!(body["points_earned"], 1);

    let (_, view) = get_json(&app, progress_uri).await;
    assert_eq!(view["completed_exercises"], 4);
    assert!((view["completion_rate"].as_f64().unwrap() - 0.8).abs() < 1e-9);
    assert_eq!(view["stars"], 3);
    assert_eq!(view["unlock_next"], true);
    assert_eq!(view["completed"], false);
}

#[tokio::test]
async fn timing_statistics_accumulate_in_the_view() {
    let (app, _state) = create_test_app();
    let uri = "/api/v1/students/student-1/answers";

    let mut body = submit_body("ex-4", "unit-1", choice_json("A"));
    body["response_time_ms"] = json!(1000);
    post_json(&app, uri, body).await;

    let mut body = submit_body("ex-4", "unit-1", choice_json("A"));
    body["response_time_ms"] = json!(3000);
    post_json(&app, uri, body).await;

    let (_, view) = get_json(
        &app,
        "/api/v1/students/student-1/units/unit-1/progress",
    )
    .await;
    assert_eq!(view["total_time_spent_ms"], 4000);
    assert!((view["average_response_time_ms"].as_f64().unwrap() - 2000.0).abs() < 1e-9);
    assert_eq!(view["correct_count"], 2);
}

#[tokio::test]
async fn points_endpoint_reports_ledger_totals() {
    let (app, _state) = create_test_app();

    let (_, body) = get_json(&app, "/api/v1/students/student-1/points").await;
    assert_eq!(body["total_points"], 0);

    post_json(
        &app,
        "/api/v1/students/student-1/answers",
        submit_body("ex-4", "unit-1", choice_json("A")),
    )
    .await;
    post_json(
        &app,
        "/api/v1/students/student-1/answers",
        submit_body("ex-1", "unit-1", choice_json("B")),
    )
    .await;

    let (_, body) = get_json(&app, "/api/v1/students/student-1/points").await;
    assert_eq!(body["total_points"], 2);
    assert_eq!(body["student_id"], "student-1");
}
