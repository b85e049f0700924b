use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::{
    models::answer::{RecordVisitRequest, SubmitAnswerRequest},
    services::{submission_service::SubmissionService, AppState},
};

pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if let Err(e) = req.validate() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, e.to_string()));
    }

    tracing::info!(
        "Submitting answer: student={}, exercise={}, unit={}",
        student_id,
        req.exercise_id,
        req.unit_id
    );

    let service = SubmissionService::new(&state);

    match service.submit_answer(&student_id, &req).await {
        Ok(response) => Ok((StatusCode::OK, Json(response))),
        Err(e) => {
            tracing::error!("Failed to submit answer: {}", e);
            Err((e.status(), e.to_string()))
        }
    }
}

pub async fn record_visit(
    State(state): State<Arc<AppState>>,
    Path((student_id, unit_id)): Path<(String, String)>,
    Json(req): Json<RecordVisitRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    tracing::info!(
        "Recording {:?} visit: student={}, unit={}",
        req.kind,
        student_id,
        unit_id
    );

    let service = SubmissionService::new(&state);

    match service.record_visit(&student_id, &unit_id, req.kind).await {
        Ok(response) => Ok((StatusCode::OK, Json(response))),
        Err(e) => {
            tracing::error!("Failed to record visit: {}", e);
            Err((e.status(), e.to_string()))
        }
    }
}
