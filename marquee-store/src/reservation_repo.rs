use chrono::{DateTime, Utc};
use marquee_domain::{Reservation, ReservationStatus, ReservedSeat, SeatType};
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::{parse_uuid, sql_placeholders};

/// Sole mutator of `reservations` and `reservation_seats`.
pub struct ReservationRepository;

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: String,
    user_id: String,
    showtime_id: String,
    status: String,
    total_price_cents: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReservationRow {
    fn into_reservation(self, seats: Vec<ReservedSeat>) -> Result<Reservation, sqlx::Error> {
        Ok(Reservation {
            id: parse_uuid(&self.id)?,
            user_id: parse_uuid(&self.user_id)?,
            showtime_id: parse_uuid(&self.showtime_id)?,
            status: parse_status(&self.status)?,
            total_price_cents: self.total_price_cents,
            seats,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ReservedSeatRow {
    seat_id: String,
    row_label: String,
    seat_number: i64,
    seat_type: String,
}

/// What cancellation needs to know about a reservation, in one fetch.
pub struct CancellationView {
    pub user_id: Uuid,
    pub status: ReservationStatus,
    pub showtime_start: i64,
}

fn parse_status(s: &str) -> Result<ReservationStatus, sqlx::Error> {
    ReservationStatus::parse(s).ok_or_else(|| {
        sqlx::Error::Decode(format!("unknown reservation status: {s}").into())
    })
}

fn parse_seat_type(s: &str) -> Result<SeatType, sqlx::Error> {
    SeatType::parse(s)
        .ok_or_else(|| sqlx::Error::Decode(format!("unknown seat type: {s}").into()))
}

impl ReservationRepository {
    /// Seats among `seat_ids` already claimed by a confirmed reservation.
    pub async fn live_seat_ids_among(
        tx: &mut Transaction<'_, Sqlite>,
        showtime_id: Uuid,
        seat_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let sql = format!(
            "SELECT seat_id FROM reservation_seats \
             WHERE showtime_id = ? AND active = 1 AND seat_id IN ({})",
            sql_placeholders(seat_ids.len())
        );
        let mut query = sqlx::query_scalar::<_, String>(&sql).bind(showtime_id.to_string());
        for id in seat_ids {
            query = query.bind(id.to_string());
        }
        let rows = query.fetch_all(&mut **tx).await?;
        rows.iter().map(|s| parse_uuid(s)).collect()
    }

    /// All confirmed-occupied seats for the showtime, for the availability
    /// snapshot.
    pub async fn live_seat_ids(
        tx: &mut Transaction<'_, Sqlite>,
        showtime_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT seat_id FROM reservation_seats WHERE showtime_id = ? AND active = 1",
        )
        .bind(showtime_id.to_string())
        .fetch_all(&mut **tx)
        .await?;
        rows.iter().map(|s| parse_uuid(s)).collect()
    }

    /// Insert the reservation header plus one live seat row per seat. The
    /// partial unique index on live (seat, showtime) pairs makes this the
    /// last line of defense against double-booking.
    pub async fn insert(
        tx: &mut Transaction<'_, Sqlite>,
        reservation: &Reservation,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO reservations \
             (id, user_id, showtime_id, status, total_price_cents, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(reservation.id.to_string())
        .bind(reservation.user_id.to_string())
        .bind(reservation.showtime_id.to_string())
        .bind(reservation.status.as_str())
        .bind(reservation.total_price_cents)
        .bind(reservation.created_at)
        .bind(reservation.updated_at)
        .execute(&mut **tx)
        .await?;

        for seat in &reservation.seats {
            sqlx::query(
                "INSERT INTO reservation_seats (reservation_id, seat_id, showtime_id, active) \
                 VALUES (?, ?, ?, 1)",
            )
            .bind(reservation.id.to_string())
            .bind(seat.seat_id.to_string())
            .bind(reservation.showtime_id.to_string())
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    pub async fn cancellation_view(
        tx: &mut Transaction<'_, Sqlite>,
        reservation_id: Uuid,
    ) -> Result<Option<CancellationView>, sqlx::Error> {
        #[derive(sqlx::FromRow)]
        struct Row {
            user_id: String,
            status: String,
            start_time: i64,
        }

        let row = sqlx::query_as::<_, Row>(
            "SELECT r.user_id, r.status, st.start_time \
             FROM reservations r JOIN showtimes st ON st.id = r.showtime_id \
             WHERE r.id = ?",
        )
        .bind(reservation_id.to_string())
        .fetch_optional(&mut **tx)
        .await?;

        match row {
            Some(row) => Ok(Some(CancellationView {
                user_id: parse_uuid(&row.user_id)?,
                status: parse_status(&row.status)?,
                showtime_start: row.start_time,
            })),
            None => Ok(None),
        }
    }

    /// Flip the reservation to cancelled and retire its seat claims, in the
    /// caller's transaction. Seat rows stay behind with active = 0.
    pub async fn mark_cancelled(
        tx: &mut Transaction<'_, Sqlite>,
        reservation_id: Uuid,
        updated_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE reservations SET status = 'cancelled', updated_at = ? WHERE id = ?")
            .bind(updated_at)
            .bind(reservation_id.to_string())
            .execute(&mut **tx)
            .await?;

        sqlx::query("UPDATE reservation_seats SET active = 0 WHERE reservation_id = ?")
            .bind(reservation_id.to_string())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub async fn get(
        pool: &SqlitePool,
        reservation_id: Uuid,
    ) -> Result<Option<Reservation>, sqlx::Error> {
        let row = sqlx::query_as::<_, ReservationRow>(
            "SELECT id, user_id, showtime_id, status, total_price_cents, created_at, updated_at \
             FROM reservations WHERE id = ?",
        )
        .bind(reservation_id.to_string())
        .fetch_optional(pool)
        .await?;

        match row {
            Some(row) => {
                let seats = Self::seats_of(pool, reservation_id).await?;
                Ok(Some(row.into_reservation(seats)?))
            }
            None => Ok(None),
        }
    }

    /// Newest-first reservations for a user; by default reservations whose
    /// showtime already started are filtered out.
    pub async fn list_for_user(
        pool: &SqlitePool,
        user_id: Uuid,
        include_past: bool,
        now: i64,
    ) -> Result<Vec<Reservation>, sqlx::Error> {
        let sql = if include_past {
            "SELECT r.id, r.user_id, r.showtime_id, r.status, r.total_price_cents, \
                    r.created_at, r.updated_at \
             FROM reservations r WHERE r.user_id = ? ORDER BY r.created_at DESC"
        } else {
            "SELECT r.id, r.user_id, r.showtime_id, r.status, r.total_price_cents, \
                    r.created_at, r.updated_at \
             FROM reservations r JOIN showtimes st ON st.id = r.showtime_id \
             WHERE r.user_id = ? AND st.start_time >= ? ORDER BY r.created_at DESC"
        };

        let mut query = sqlx::query_as::<_, ReservationRow>(sql).bind(user_id.to_string());
        if !include_past {
            query = query.bind(now);
        }
        let rows = query.fetch_all(pool).await?;

        let mut reservations = Vec::with_capacity(rows.len());
        for row in rows {
            let id = parse_uuid(&row.id)?;
            let seats = Self::seats_of(pool, id).await?;
            reservations.push(row.into_reservation(seats)?);
        }
        Ok(reservations)
    }

    pub async fn seats_of(
        pool: &SqlitePool,
        reservation_id: Uuid,
    ) -> Result<Vec<ReservedSeat>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ReservedSeatRow>(
            "SELECT rs.seat_id, s.row_label, s.seat_number, s.seat_type \
             FROM reservation_seats rs JOIN seats s ON s.id = rs.seat_id \
             WHERE rs.reservation_id = ? ORDER BY s.row_label, s.seat_number",
        )
        .bind(reservation_id.to_string())
        .fetch_all(pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(ReservedSeat {
                    seat_id: parse_uuid(&row.seat_id)?,
                    row_label: row.row_label,
                    seat_number: row.seat_number,
                    seat_type: parse_seat_type(&row.seat_type)?,
                })
            })
            .collect()
    }
}
