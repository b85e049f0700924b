use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

use crate::{
    models::progress::{BatchProgressRequest, PointsResponse},
    services::{batch_progress::BatchProgressResolver, AppState},
};

pub async fn get_unit_progress(
    State(state): State<Arc<AppState>>,
    Path((student_id, unit_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    tracing::info!("Getting unit progress: student={}, unit={}", student_id, unit_id);

    let resolver = BatchProgressResolver::new(&state);

    match resolver.unit_progress(&student_id, &unit_id).await {
        Ok(view) => Ok((StatusCode::OK, Json(view))),
        Err(e) => {
            tracing::error!("Failed to get unit progress: {}", e);
            Err((e.status(), e.to_string()))
        }
    }
}

/// Batch progress never fails as a whole: every requested unit id comes back,
/// degraded entries included, within the deadline.
pub async fn batch_progress(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
    Json(req): Json<BatchProgressRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if let Err(e) = req.validate() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, e.to_string()));
    }

    // Caller-supplied deadlines are capped by configuration.
    let timeout_ms = req
        .timeout_ms
        .unwrap_or(state.config.batch_timeout_ms)
        .min(state.config.batch_timeout_cap_ms);

    tracing::info!(
        "Resolving batch progress: student={}, units={}, timeout={}ms",
        student_id,
        req.unit_ids.len(),
        timeout_ms
    );

    let resolver = BatchProgressResolver::new(&state);
    let results = resolver
        .batch_progress(&student_id, &req.unit_ids, Duration::from_millis(timeout_ms))
        .await;

    Ok((StatusCode::OK, Json(results)))
}

pub async fn get_points(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
) -> impl IntoResponse {
    let total_points = state.rewards.total(&student_id);
    (
        StatusCode::OK,
        Json(PointsResponse {
            student_id,
            total_points,
        }),
    )
}
