use async_trait::async_trait;
use marquee_domain::repository::ShowtimeDirectory;
use marquee_domain::{Seat, SeatType, Showtime};
use sqlx::SqlitePool;
use std::error::Error;
use uuid::Uuid;

use crate::{parse_uuid, sql_placeholders};

/// Read-only view over the scheduling side's tables.
pub struct StoreShowtimeRepository {
    pool: SqlitePool,
}

impl StoreShowtimeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ShowtimeRow {
    id: String,
    theater_id: String,
    start_time: i64,
    end_time: i64,
    base_price_cents: i64,
}

#[derive(sqlx::FromRow)]
struct SeatRow {
    id: String,
    theater_id: String,
    row_label: String,
    seat_number: i64,
    seat_type: String,
}

fn seat_from_row(row: SeatRow) -> Result<Seat, sqlx::Error> {
    let seat_type = SeatType::parse(&row.seat_type)
        .ok_or_else(|| sqlx::Error::Decode(format!("unknown seat type: {}", row.seat_type).into()))?;
    Ok(Seat {
        id: parse_uuid(&row.id)?,
        theater_id: parse_uuid(&row.theater_id)?,
        row_label: row.row_label,
        seat_number: row.seat_number,
        seat_type,
    })
}

#[async_trait]
impl ShowtimeDirectory for StoreShowtimeRepository {
    async fn get_showtime(
        &self,
        id: Uuid,
    ) -> Result<Option<Showtime>, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query_as::<_, ShowtimeRow>(
            "SELECT id, theater_id, start_time, end_time, base_price_cents \
             FROM showtimes WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Showtime {
                id: parse_uuid(&row.id)?,
                theater_id: parse_uuid(&row.theater_id)?,
                start_time: row.start_time,
                end_time: row.end_time,
                base_price_cents: row.base_price_cents,
            })),
            None => Ok(None),
        }
    }

    async fn list_seats(
        &self,
        theater_id: Uuid,
    ) -> Result<Vec<Seat>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, SeatRow>(
            "SELECT id, theater_id, row_label, seat_number, seat_type \
             FROM seats WHERE theater_id = ? ORDER BY row_label, seat_number",
        )
        .bind(theater_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut seats = Vec::with_capacity(rows.len());
        for row in rows {
            seats.push(seat_from_row(row)?);
        }
        Ok(seats)
    }

    async fn seats_by_ids(
        &self,
        theater_id: Uuid,
        seat_ids: &[Uuid],
    ) -> Result<Vec<Seat>, Box<dyn Error + Send + Sync>> {
        if seat_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT id, theater_id, row_label, seat_number, seat_type \
             FROM seats WHERE theater_id = ? AND id IN ({})",
            sql_placeholders(seat_ids.len())
        );
        let mut query = sqlx::query_as::<_, SeatRow>(&sql).bind(theater_id.to_string());
        for id in seat_ids {
            query = query.bind(id.to_string());
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut seats = Vec::with_capacity(rows.len());
        for row in rows {
            seats.push(seat_from_row(row)?);
        }
        Ok(seats)
    }
}
