use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::seat::SeatType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<ReservationStatus> {
        match s {
            "confirmed" => Some(ReservationStatus::Confirmed),
            "cancelled" => Some(ReservationStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub showtime_id: Uuid,
    pub status: ReservationStatus,
    pub total_price_cents: i64,
    pub seats: Vec<ReservedSeat>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Seat detail carried on a reservation. The underlying join rows survive
/// cancellation for audit; only rows under a confirmed reservation count as
/// occupancy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservedSeat {
    pub seat_id: Uuid,
    pub row_label: String,
    pub seat_number: i64,
    pub seat_type: SeatType,
}
