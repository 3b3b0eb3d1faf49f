use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LockSeatsRequest {
    pub seat_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct LockSeatsResponse {
    pub locked_seat_ids: Vec<Uuid>,
    pub expires_at: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/showtimes/{showtime_id}/lock-seats", post(lock_seats))
        .route(
            "/api/v1/showtimes/{showtime_id}/release-seats",
            post(release_seats),
        )
}

async fn lock_seats(
    State(state): State<AppState>,
    Path(showtime_id): Path<Uuid>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<LockSeatsRequest>,
) -> Result<Json<LockSeatsResponse>, ApiError> {
    let grant = state
        .locks
        .acquire(showtime_id, &req.seat_ids, user.id)
        .await?;

    Ok(Json(LockSeatsResponse {
        locked_seat_ids: grant.locks.iter().map(|lock| lock.seat_id).collect(),
        expires_at: grant.expires_at,
    }))
}

async fn release_seats(
    State(state): State<AppState>,
    Path(showtime_id): Path<Uuid>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<LockSeatsRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .locks
        .release(showtime_id, &req.seat_ids, user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
