#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use masteryhub_api::error::EngineError;
use masteryhub_api::models::answer::{AnswerPayload, MatchPair};
use masteryhub_api::models::catalog::{Difficulty, Exercise, ExerciseKind, Unit};
use masteryhub_api::services::catalog::{
    CatalogReader, InMemoryCatalog, InMemoryDirectory,
};
use masteryhub_api::{config::Config, create_router, AppState};

pub fn choice(selected: &str) -> AnswerPayload {
    AnswerPayload::Choice {
        selected: selected.to_string(),
    }
}

fn exercise(
    id: &str,
    unit_id: &str,
    subject: &str,
    kind: ExerciseKind,
    correct: AnswerPayload,
) -> Exercise {
    Exercise {
        id: id.to_string(),
        unit_id: unit_id.to_string(),
        subject: subject.to_string(),
        kind,
        correct_answer: correct,
        difficulty: Difficulty::Easy,
    }
}

/// Seeded in-memory catalog shared by all integration suites:
/// - unit-1 (math, 5 exercises): ex-1 choice "B", ex-2 blank "42", ex-4 choice "A"
/// - unit-2 (english, 5 exercises): ex-3 matching, ex-6..ex-9 choice "A"
/// - unit-3 (science, 10 exercises): ex-5 choice "A"
fn seeded_catalog() -> (Arc<InMemoryCatalog>, Arc<InMemoryDirectory>) {
    let catalog = Arc::new(InMemoryCatalog::new());
    catalog.insert_unit(Unit {
        id: "unit-1".to_string(),
        total_exercise_count: 5,
    });
    catalog.insert_unit(Unit {
        id: "unit-2".to_string(),
        total_exercise_count: 5,
    });
    catalog.insert_unit(Unit {
        id: "unit-3".to_string(),
        total_exercise_count: 10,
    });

    catalog.insert_exercise(exercise(
        "ex-1",
        "unit-1",
        "math",
        ExerciseKind::SingleChoice,
        choice("B"),
    ));
    catalog.insert_exercise(exercise(
        "ex-2",
        "unit-1",
        "math",
        ExerciseKind::FillBlank,
        AnswerPayload::FillBlank {
            text: "42".to_string(),
        },
    ));
    catalog.insert_exercise(exercise(
        "ex-4",
        "unit-1",
        "math",
        ExerciseKind::SingleChoice,
        choice("A"),
    ));
    catalog.insert_exercise(exercise(
        "ex-3",
        "unit-2",
        "english",
        ExerciseKind::Matching,
        AnswerPayload::Matching {
            pairs: vec![
                MatchPair {
                    left: "cat".to_string(),
                    right: "chat".to_string(),
                },
                MatchPair {
                    left: "dog".to_string(),
                    right: "chien".to_string(),
                },
            ],
        },
    ));
    for n in 6..=9 {
        catalog.insert_exercise(exercise(
            &format!("ex-{n}"),
            "unit-2",
            "english",
            ExerciseKind::SingleChoice,
            choice("A"),
        ));
    }
    catalog.insert_exercise(exercise(
        "ex-5",
        "unit-3",
        "science",
        ExerciseKind::SingleChoice,
        choice("A"),
    ));

    let directory = Arc::new(InMemoryDirectory::new());
    directory.add_student("student-1");
    directory.add_student("student-2");

    (catalog, directory)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn create_test_state() -> Arc<AppState> {
    init_tracing();
    let (catalog, directory) = seeded_catalog();
    Arc::new(AppState::new(Config::for_tests(), catalog, directory))
}

pub fn create_test_app() -> (Router, Arc<AppState>) {
    let state = create_test_state();
    (create_router(state.clone()), state)
}

/// Catalog wrapper whose `get_unit` stalls for `delay` on one unit once the
/// toggle is flipped; used to drive the batch deadline scenario.
pub struct DelayedCatalog {
    inner: Arc<InMemoryCatalog>,
    slow_unit: String,
    delay: Duration,
    enabled: Arc<AtomicBool>,
}

#[async_trait]
impl CatalogReader for DelayedCatalog {
    async fn get_exercise(&self, exercise_id: &str) -> Result<Exercise, EngineError> {
        self.inner.get_exercise(exercise_id).await
    }

    async fn get_unit(&self, unit_id: &str) -> Result<Unit, EngineError> {
        if unit_id == self.slow_unit && self.enabled.load(Ordering::SeqCst) {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.get_unit(unit_id).await
    }
}

pub fn create_delayed_test_app(
    slow_unit: &str,
    delay: Duration,
) -> (Router, Arc<AppState>, Arc<AtomicBool>) {
    init_tracing();
    let (catalog, directory) = seeded_catalog();
    let enabled = Arc::new(AtomicBool::new(false));
    let delayed = Arc::new(DelayedCatalog {
        inner: catalog,
        slow_unit: slow_unit.to_string(),
        delay,
        enabled: enabled.clone(),
    });
    let state = Arc::new(AppState::new(Config::for_tests(), delayed, directory));
    (create_router(state.clone()), state, enabled)
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, json)
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, json)
}

/// Submission body for a single-choice answer in the seeded catalog.
pub fn submit_body(exercise_id: &str, unit_id: &str, answer: Value) -> Value {
    json!({
        "exercise_id": exercise_id,
        "unit_id": unit_id,
        "user_answer": answer,
        "response_time_ms": 1500,
        "session_id": "session-1",
        "practice_mode": "normal"
    })
}

pub fn choice_json(selected: &str) -> Value {
    json!({ "kind": "choice", "selected": selected })
}
