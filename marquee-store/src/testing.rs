//! Seed fixtures for integration tests. Theater/showtime data entry is
//! owned by the scheduling side in production; tests insert it directly.

use chrono::Utc;
use marquee_domain::SeatType;
use sqlx::SqlitePool;
use uuid::Uuid;

pub struct TheaterFixture {
    pub theater_id: Uuid,
    pub showtime_id: Uuid,
    pub base_price_cents: i64,
    /// A1, A2 regular; B1 premium; B2 vip.
    pub seat_a1: Uuid,
    pub seat_a2: Uuid,
    pub seat_b1_premium: Uuid,
    pub seat_b2_vip: Uuid,
}

pub async fn insert_theater(pool: &SqlitePool, name: &str) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO theaters (id, name) VALUES (?, ?)")
        .bind(id.to_string())
        .bind(name)
        .execute(pool)
        .await?;
    Ok(id)
}

pub async fn insert_seat(
    pool: &SqlitePool,
    theater_id: Uuid,
    row_label: &str,
    seat_number: i64,
    seat_type: SeatType,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO seats (id, theater_id, row_label, seat_number, seat_type) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(theater_id.to_string())
    .bind(row_label)
    .bind(seat_number)
    .bind(seat_type.as_str())
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn insert_showtime(
    pool: &SqlitePool,
    theater_id: Uuid,
    start_time: i64,
    end_time: i64,
    base_price_cents: i64,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO showtimes (id, theater_id, start_time, end_time, base_price_cents) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(theater_id.to_string())
    .bind(start_time)
    .bind(end_time)
    .bind(base_price_cents)
    .execute(pool)
    .await?;
    Ok(id)
}

/// Four-seat theater with one showtime starting `start_offset_secs` from
/// now (negative offsets seed an already-started showtime).
pub async fn seed_small_theater(
    pool: &SqlitePool,
    start_offset_secs: i64,
    base_price_cents: i64,
) -> Result<TheaterFixture, sqlx::Error> {
    let theater_id = insert_theater(pool, "Screen 1").await?;
    let seat_a1 = insert_seat(pool, theater_id, "A", 1, SeatType::Regular).await?;
    let seat_a2 = insert_seat(pool, theater_id, "A", 2, SeatType::Regular).await?;
    let seat_b1_premium = insert_seat(pool, theater_id, "B", 1, SeatType::Premium).await?;
    let seat_b2_vip = insert_seat(pool, theater_id, "B", 2, SeatType::Vip).await?;

    let start = Utc::now().timestamp() + start_offset_secs;
    let showtime_id =
        insert_showtime(pool, theater_id, start, start + 7200, base_price_cents).await?;

    Ok(TheaterFixture {
        theater_id,
        showtime_id,
        base_price_cents,
        seat_a1,
        seat_a2,
        seat_b1_premium,
        seat_b2_vip,
    })
}
