use chrono::Utc;
use marquee_store::LockRepository;
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::{error, info};

const SWEEP_BATCH: i64 = 500;

/// One sweep: delete every lock already past expiry, in bounded batches.
/// Deleting a row another writer already removed is a no-op, so sweeps are
/// idempotent and safe to run concurrently with acquires, commits, and
/// other sweeper replicas.
pub async fn sweep_once(pool: &SqlitePool, batch: i64) -> Result<u64, sqlx::Error> {
    let now = Utc::now().timestamp();
    let mut total = 0u64;
    loop {
        let deleted = LockRepository::delete_expired_batch(pool, now, batch).await?;
        total += deleted;
        if deleted < batch as u64 {
            break;
        }
    }
    Ok(total)
}

/// Recurring background task reclaiming abandoned seat locks. Store errors
/// are logged and the loop keeps ticking; the next sweep picks up whatever
/// this one missed.
pub async fn run(pool: SqlitePool, interval: Duration) {
    info!(interval_secs = interval.as_secs(), "seat lock sweeper started");
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match sweep_once(&pool, SWEEP_BATCH).await {
            Ok(0) => {}
            Ok(reclaimed) => info!(reclaimed, "expired seat locks reclaimed"),
            Err(e) => error!("seat lock sweep failed: {}", e),
        }
    }
}
