use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use marquee_reserve::SeatMap;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/v1/showtimes/{showtime_id}/seats",
        get(seat_availability),
    )
}

async fn seat_availability(
    State(state): State<AppState>,
    Path(showtime_id): Path<Uuid>,
) -> Result<Json<SeatMap>, ApiError> {
    let seat_map = state.availability.seat_map(showtime_id).await?;
    Ok(Json(seat_map))
}
