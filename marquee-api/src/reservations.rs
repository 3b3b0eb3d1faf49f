use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use marquee_domain::Reservation;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub showtime_id: Uuid,
    pub seat_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub include_past: bool,
}

#[derive(Debug, Serialize)]
pub struct ReservationListResponse {
    pub reservations: Vec<Reservation>,
    pub total: usize,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/reservations", post(create_reservation))
        .route("/api/v1/reservations", get(list_reservations))
        .route("/api/v1/reservations/{reservation_id}", get(get_reservation))
        .route(
            "/api/v1/reservations/{reservation_id}",
            delete(cancel_reservation),
        )
}

async fn create_reservation(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>), ApiError> {
    let reservation = state
        .reservations
        .commit(req.showtime_id, &req.seat_ids, user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

async fn list_reservations(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ReservationListResponse>, ApiError> {
    let reservations = state
        .reservations
        .list_for_user(user.id, query.include_past)
        .await?;
    Ok(Json(ReservationListResponse {
        total: reservations.len(),
        reservations,
    }))
}

async fn get_reservation(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<Reservation>, ApiError> {
    let reservation = state
        .reservations
        .get(reservation_id, user.owner_scope())
        .await?;
    Ok(Json(reservation))
}

async fn cancel_reservation(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(reservation_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .reservations
        .cancel(reservation_id, user.owner_scope())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
