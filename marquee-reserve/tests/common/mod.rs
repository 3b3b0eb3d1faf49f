#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use marquee_domain::repository::ShowtimeDirectory;
use marquee_reserve::{AvailabilityResolver, LockManager, ReservationCommitter};
use marquee_store::app_config::BusinessRules;
use marquee_store::testing::{seed_small_theater, TheaterFixture};
use marquee_store::{Db, StoreShowtimeRepository};
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

pub struct TestEnv {
    // Keeps the database file alive for the duration of the test.
    pub _dir: TempDir,
    pub db: Db,
    pub fixture: TheaterFixture,
    pub locks: Arc<LockManager>,
    pub committer: Arc<ReservationCommitter>,
    pub availability: AvailabilityResolver,
}

/// Fresh database with a four-seat theater and a showtime starting tomorrow.
pub async fn setup() -> TestEnv {
    setup_with_offset(86_400).await
}

/// Negative offsets seed a showtime that has already started.
pub async fn setup_with_offset(start_offset_secs: i64) -> TestEnv {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite:{}", dir.path().join("marquee-test.db").display());
    let db = Db::connect(&url, Duration::from_secs(5))
        .await
        .expect("connect test database");
    db.init_schema().await.expect("init schema");

    let fixture = seed_small_theater(&db.pool, start_offset_secs, 1000)
        .await
        .expect("seed theater");

    let rules = BusinessRules::default();
    let showtimes: Arc<dyn ShowtimeDirectory> =
        Arc::new(StoreShowtimeRepository::new(db.pool.clone()));

    TestEnv {
        locks: Arc::new(LockManager::new(db.pool.clone(), showtimes.clone(), &rules)),
        committer: Arc::new(ReservationCommitter::new(
            db.pool.clone(),
            showtimes.clone(),
            rules,
        )),
        availability: AvailabilityResolver::new(db.pool.clone(), showtimes),
        _dir: dir,
        db,
        fixture,
    }
}

/// Backdate every lock for the showtime past its expiry, as if the holder
/// walked away and the TTL ran out.
pub async fn force_expire_locks(pool: &SqlitePool, showtime_id: Uuid) {
    sqlx::query("UPDATE seat_locks SET expires_at = ? WHERE showtime_id = ?")
        .bind(Utc::now().timestamp() - 61)
        .bind(showtime_id.to_string())
        .execute(pool)
        .await
        .expect("expire locks");
}

pub async fn lock_count(pool: &SqlitePool, showtime_id: Uuid) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM seat_locks WHERE showtime_id = ?")
        .bind(showtime_id.to_string())
        .fetch_one(pool)
        .await
        .expect("count locks")
}

pub async fn live_claim_count(pool: &SqlitePool, showtime_id: Uuid, seat_id: Uuid) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM reservation_seats \
         WHERE showtime_id = ? AND seat_id = ? AND active = 1",
    )
    .bind(showtime_id.to_string())
    .bind(seat_id.to_string())
    .fetch_one(pool)
    .await
    .expect("count live claims")
}
