use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::{
    models::wrong_answer::WrongAnswerQuery,
    services::{wrong_answer_service::WrongAnswerTracker, AppState},
};

pub async fn list_wrong_answers(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
    Query(query): Query<WrongAnswerQuery>,
) -> impl IntoResponse {
    tracing::info!(
        "Listing wrong answers: student={}, subject={:?}, unit={:?}",
        student_id,
        query.subject,
        query.unit_id
    );

    let tracker = WrongAnswerTracker::new(&state);
    let summaries = tracker.wrong_answers(&student_id, &query);
    (StatusCode::OK, Json(summaries))
}
