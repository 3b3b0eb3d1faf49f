use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use marquee_domain::repository::ShowtimeDirectory;
use marquee_domain::{Reservation, ReservationStatus, ReservedSeat, SeatLock};
use marquee_store::app_config::BusinessRules;
use marquee_store::{LockRepository, ReservationRepository};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::{map_conflict, ReservationError};
use crate::pricing;
use crate::validate;

/// Converts a caller's held locks into a durable reservation. Commit never
/// takes seat-row contention of its own: only a lock holder can get here,
/// and locks are exclusive per (seat, showtime) by construction, so lock
/// ownership is the correctness argument.
pub struct ReservationCommitter {
    pool: SqlitePool,
    showtimes: Arc<dyn ShowtimeDirectory>,
    rules: BusinessRules,
}

impl ReservationCommitter {
    pub fn new(
        pool: SqlitePool,
        showtimes: Arc<dyn ShowtimeDirectory>,
        rules: BusinessRules,
    ) -> Self {
        Self {
            pool,
            showtimes,
            rules,
        }
    }

    pub async fn commit(
        &self,
        showtime_id: Uuid,
        seat_ids: &[Uuid],
        user_id: Uuid,
    ) -> Result<Reservation, ReservationError> {
        let now = Utc::now().timestamp();
        let (showtime, mut seats) =
            validate::showtime_and_seats(&self.showtimes, showtime_id, seat_ids, now).await?;
        seats.sort_by(|a, b| (&a.row_label, a.seat_number).cmp(&(&b.row_label, b.seat_number)));

        let mut tx = self.pool.begin().await?;

        let locks = LockRepository::locks_for_seats(&mut tx, showtime_id, seat_ids).await?;
        let by_seat: HashMap<Uuid, &SeatLock> =
            locks.iter().map(|lock| (lock.seat_id, lock)).collect();

        // Classification order: a seat with no lock at all beats an expired
        // lock beats a lock held by someone else.
        if seat_ids.iter().any(|id| !by_seat.contains_key(id)) {
            return Err(ReservationError::LockMissing);
        }
        if locks.iter().any(|lock| lock.is_expired(now)) {
            return Err(ReservationError::LockExpired);
        }
        if locks.iter().any(|lock| lock.user_id != user_id) {
            return Err(ReservationError::LockNotOwned);
        }

        let total_price_cents =
            pricing::total_price_cents(showtime.base_price_cents, &seats, &self.rules);

        let created_at = Utc::now();
        let reservation = Reservation {
            id: Uuid::new_v4(),
            user_id,
            showtime_id,
            status: ReservationStatus::Confirmed,
            total_price_cents,
            seats: seats
                .iter()
                .map(|seat| ReservedSeat {
                    seat_id: seat.id,
                    row_label: seat.row_label.clone(),
                    seat_number: seat.seat_number,
                    seat_type: seat.seat_type,
                })
                .collect(),
            created_at,
            updated_at: created_at,
        };

        ReservationRepository::insert(&mut tx, &reservation)
            .await
            .map_err(|e| map_conflict(e, seat_ids))?;

        // The reservation-seat rows now carry the occupancy claim; the
        // consumed locks are gone for good.
        LockRepository::delete_owned(&mut tx, showtime_id, seat_ids, user_id).await?;

        tx.commit().await.map_err(|e| map_conflict(e, seat_ids))?;

        info!(
            reservation_id = %reservation.id,
            %showtime_id,
            %user_id,
            seats = seat_ids.len(),
            total_price_cents,
            "reservation confirmed"
        );

        Ok(reservation)
    }

    /// Cancel a confirmed reservation before its showtime starts. `owner`
    /// is the requesting user, or `None` when the boundary has already
    /// established an admin scope.
    pub async fn cancel(
        &self,
        reservation_id: Uuid,
        owner: Option<Uuid>,
    ) -> Result<(), ReservationError> {
        let now = Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        let view = ReservationRepository::cancellation_view(&mut tx, reservation_id)
            .await?
            .ok_or(ReservationError::NotFound {
                resource: "reservation",
            })?;

        if let Some(user_id) = owner {
            if view.user_id != user_id {
                return Err(ReservationError::NotOwned);
            }
        }
        if view.status == ReservationStatus::Cancelled {
            return Err(ReservationError::AlreadyCancelled);
        }
        if view.showtime_start <= now {
            return Err(ReservationError::AlreadyStarted);
        }

        ReservationRepository::mark_cancelled(&mut tx, reservation_id, Utc::now()).await?;
        tx.commit().await?;

        info!(%reservation_id, "reservation cancelled");
        Ok(())
    }

    pub async fn get(
        &self,
        reservation_id: Uuid,
        owner: Option<Uuid>,
    ) -> Result<Reservation, ReservationError> {
        let reservation = ReservationRepository::get(&self.pool, reservation_id)
            .await?
            .ok_or(ReservationError::NotFound {
                resource: "reservation",
            })?;

        if let Some(user_id) = owner {
            if reservation.user_id != user_id {
                return Err(ReservationError::NotOwned);
            }
        }
        Ok(reservation)
    }

    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        include_past: bool,
    ) -> Result<Vec<Reservation>, ReservationError> {
        let now = Utc::now().timestamp();
        ReservationRepository::list_for_user(&self.pool, user_id, include_past, now)
            .await
            .map_err(Into::into)
    }
}
