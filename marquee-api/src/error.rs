use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use marquee_reserve::ReservationError;
use serde_json::json;

/// HTTP rendering of the core error taxonomy. Conflicting seat ids ride
/// along in the body so clients can highlight the exact seats they lost.
#[derive(Debug)]
pub struct ApiError(pub ReservationError);

impl From<ReservationError> for ApiError {
    fn from(e: ReservationError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ReservationError::SeatUnavailable { .. }
            | ReservationError::LockMissing
            | ReservationError::LockExpired
            | ReservationError::LockNotOwned
            | ReservationError::AlreadyStarted
            | ReservationError::AlreadyCancelled => StatusCode::CONFLICT,
            ReservationError::NotFound { .. } => StatusCode::NOT_FOUND,
            ReservationError::NotOwned => StatusCode::FORBIDDEN,
            ReservationError::InvalidSeats(_) => StatusCode::BAD_REQUEST,
            ReservationError::Store(msg) => {
                tracing::error!("store failure: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = match &self.0 {
            ReservationError::Store(_) => json!({ "error": "internal server error" }),
            ReservationError::SeatUnavailable { seat_ids } => {
                json!({ "error": self.0.to_string(), "seat_ids": seat_ids })
            }
            _ => json!({ "error": self.0.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
