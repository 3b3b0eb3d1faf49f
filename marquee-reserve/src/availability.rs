use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use marquee_domain::repository::ShowtimeDirectory;
use marquee_domain::SeatType;
use marquee_store::{LockRepository, ReservationRepository};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::ReservationError;

#[derive(Debug, Clone, Serialize)]
pub struct SeatAvailability {
    pub seat_id: Uuid,
    pub row_label: String,
    pub seat_number: i64,
    pub seat_label: String,
    pub seat_type: SeatType,
    pub is_available: bool,
    pub is_locked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatMap {
    pub showtime_id: Uuid,
    pub total_seats: usize,
    pub available_seats: usize,
    pub seats: Vec<SeatAvailability>,
}

/// Derives the real-time seat state for a showtime: a seat is taken iff a
/// confirmed reservation claims it or a non-expired lock holds it. The view
/// is advisory; the authoritative checks happen inside the acquire and
/// commit transactions.
pub struct AvailabilityResolver {
    pool: SqlitePool,
    showtimes: Arc<dyn ShowtimeDirectory>,
}

impl AvailabilityResolver {
    pub fn new(pool: SqlitePool, showtimes: Arc<dyn ShowtimeDirectory>) -> Self {
        Self { pool, showtimes }
    }

    pub async fn seat_map(&self, showtime_id: Uuid) -> Result<SeatMap, ReservationError> {
        let showtime = self
            .showtimes
            .get_showtime(showtime_id)
            .await?
            .ok_or(ReservationError::NotFound {
                resource: "showtime",
            })?;

        let seats = self.showtimes.list_seats(showtime.theater_id).await?;
        let now = Utc::now().timestamp();

        // Both occupancy sets come from one transaction so the view is a
        // single snapshot.
        let mut tx = self.pool.begin().await?;
        let reserved = ReservationRepository::live_seat_ids(&mut tx, showtime_id).await?;
        let locked = LockRepository::active_seat_ids(&mut tx, showtime_id, now).await?;
        tx.commit().await?;

        let reserved: HashSet<Uuid> = reserved.into_iter().collect();
        let locked: HashSet<Uuid> = locked.into_iter().collect();

        let mut available_seats = 0;
        let seats: Vec<SeatAvailability> = seats
            .into_iter()
            .map(|seat| {
                let is_reserved = reserved.contains(&seat.id);
                let is_locked = locked.contains(&seat.id);
                let is_available = !is_reserved && !is_locked;
                if is_available {
                    available_seats += 1;
                }
                SeatAvailability {
                    seat_label: seat.seat_label(),
                    seat_id: seat.id,
                    row_label: seat.row_label,
                    seat_number: seat.seat_number,
                    seat_type: seat.seat_type,
                    is_available,
                    is_locked,
                }
            })
            .collect();

        Ok(SeatMap {
            showtime_id,
            total_seats: seats.len(),
            available_seats,
            seats,
        })
    }
}
