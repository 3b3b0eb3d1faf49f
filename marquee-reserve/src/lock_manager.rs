use std::sync::Arc;

use chrono::Utc;
use marquee_domain::repository::ShowtimeDirectory;
use marquee_domain::SeatLock;
use marquee_store::app_config::BusinessRules;
use marquee_store::{LockRepository, ReservationRepository};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{map_conflict, ReservationError};
use crate::validate;

#[derive(Debug)]
pub struct SeatGrant {
    pub locks: Vec<SeatLock>,
    pub expires_at: i64,
}

/// Grants, renews and releases temporary seat holds. All-or-nothing: a
/// request either locks every seat it asked for or locks none.
pub struct LockManager {
    pool: SqlitePool,
    showtimes: Arc<dyn ShowtimeDirectory>,
    ttl_seconds: i64,
}

impl LockManager {
    pub fn new(
        pool: SqlitePool,
        showtimes: Arc<dyn ShowtimeDirectory>,
        rules: &BusinessRules,
    ) -> Self {
        Self {
            pool,
            showtimes,
            ttl_seconds: rules.seat_lock_ttl_minutes as i64 * 60,
        }
    }

    /// Lock `seat_ids` for `user_id` until now + TTL.
    ///
    /// The whole check-and-insert runs in one transaction whose first
    /// statement is a write (the expired-lock purge), so the store's writer
    /// lock serializes every competing acquirer before any check runs.
    /// Seats the user already holds are renewed, not duplicated.
    pub async fn acquire(
        &self,
        showtime_id: Uuid,
        seat_ids: &[Uuid],
        user_id: Uuid,
    ) -> Result<SeatGrant, ReservationError> {
        let now = Utc::now().timestamp();
        validate::showtime_and_seats(&self.showtimes, showtime_id, seat_ids, now).await?;

        let mut tx = self.pool.begin().await?;

        LockRepository::purge_expired(&mut tx, showtime_id, seat_ids, now)
            .await
            .map_err(|e| map_conflict(e, seat_ids))?;

        let reserved =
            ReservationRepository::live_seat_ids_among(&mut tx, showtime_id, seat_ids).await?;
        if !reserved.is_empty() {
            return Err(ReservationError::SeatUnavailable { seat_ids: reserved });
        }

        let foreign =
            LockRepository::foreign_active_seat_ids(&mut tx, showtime_id, seat_ids, user_id, now)
                .await?;
        if !foreign.is_empty() {
            return Err(ReservationError::SeatUnavailable { seat_ids: foreign });
        }

        // Renewal path: replace the caller's remaining locks wholesale so
        // every requested seat ends up with the same fresh expiry.
        LockRepository::delete_owned(&mut tx, showtime_id, seat_ids, user_id).await?;

        let expires_at = now + self.ttl_seconds;
        let mut locks = Vec::with_capacity(seat_ids.len());
        for seat_id in seat_ids {
            let lock = SeatLock {
                id: Uuid::new_v4(),
                seat_id: *seat_id,
                showtime_id,
                user_id,
                expires_at,
                created_at: now,
            };
            LockRepository::insert(&mut tx, &lock)
                .await
                .map_err(|e| map_conflict(e, std::slice::from_ref(seat_id)))?;
            locks.push(lock);
        }

        tx.commit().await.map_err(|e| map_conflict(e, seat_ids))?;

        debug!(
            %showtime_id,
            %user_id,
            seats = seat_ids.len(),
            expires_at,
            "seat locks granted"
        );

        Ok(SeatGrant { locks, expires_at })
    }

    /// Holder-initiated release (user deselects seats). Deletes only the
    /// caller's own locks; releasing a seat that is not held is a no-op.
    pub async fn release(
        &self,
        showtime_id: Uuid,
        seat_ids: &[Uuid],
        user_id: Uuid,
    ) -> Result<u64, ReservationError> {
        if seat_ids.is_empty() {
            return Err(ReservationError::InvalidSeats("no seats requested".into()));
        }

        let mut tx = self.pool.begin().await?;
        let released =
            LockRepository::delete_owned(&mut tx, showtime_id, seat_ids, user_id).await?;
        tx.commit().await?;

        debug!(%showtime_id, %user_id, released, "seat locks released");
        Ok(released)
    }
}
