use marquee_domain::SeatLock;
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::{parse_uuid, sql_placeholders};

/// Sole mutator of `seat_locks`. Multi-step mutations run inside a caller
/// transaction; the first statement of every such transaction must be a
/// write so SQLite's writer lock serializes competing callers up front.
pub struct LockRepository;

#[derive(sqlx::FromRow)]
struct LockRow {
    id: String,
    seat_id: String,
    showtime_id: String,
    user_id: String,
    expires_at: i64,
    created_at: i64,
}

impl LockRow {
    fn into_lock(self) -> Result<SeatLock, sqlx::Error> {
        Ok(SeatLock {
            id: parse_uuid(&self.id)?,
            seat_id: parse_uuid(&self.seat_id)?,
            showtime_id: parse_uuid(&self.showtime_id)?,
            user_id: parse_uuid(&self.user_id)?,
            expires_at: self.expires_at,
            created_at: self.created_at,
        })
    }
}

impl LockRepository {
    /// Delete expired locks on the given seats. Doubles as the write that
    /// takes the transaction's writer lock before any check runs.
    pub async fn purge_expired(
        tx: &mut Transaction<'_, Sqlite>,
        showtime_id: Uuid,
        seat_ids: &[Uuid],
        now: i64,
    ) -> Result<u64, sqlx::Error> {
        let sql = format!(
            "DELETE FROM seat_locks WHERE showtime_id = ? AND expires_at <= ? AND seat_id IN ({})",
            sql_placeholders(seat_ids.len())
        );
        let mut query = sqlx::query(&sql).bind(showtime_id.to_string()).bind(now);
        for id in seat_ids {
            query = query.bind(id.to_string());
        }
        let result = query.execute(&mut **tx).await?;
        Ok(result.rows_affected())
    }

    /// Seats among `seat_ids` holding a non-expired lock owned by someone
    /// other than `user_id`.
    pub async fn foreign_active_seat_ids(
        tx: &mut Transaction<'_, Sqlite>,
        showtime_id: Uuid,
        seat_ids: &[Uuid],
        user_id: Uuid,
        now: i64,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let sql = format!(
            "SELECT seat_id FROM seat_locks \
             WHERE showtime_id = ? AND expires_at > ? AND user_id != ? AND seat_id IN ({})",
            sql_placeholders(seat_ids.len())
        );
        let mut query = sqlx::query_scalar::<_, String>(&sql)
            .bind(showtime_id.to_string())
            .bind(now)
            .bind(user_id.to_string());
        for id in seat_ids {
            query = query.bind(id.to_string());
        }
        let rows = query.fetch_all(&mut **tx).await?;
        rows.iter().map(|s| parse_uuid(s)).collect()
    }

    /// All locks (expired or not, any owner) on the given seats.
    pub async fn locks_for_seats(
        tx: &mut Transaction<'_, Sqlite>,
        showtime_id: Uuid,
        seat_ids: &[Uuid],
    ) -> Result<Vec<SeatLock>, sqlx::Error> {
        let sql = format!(
            "SELECT id, seat_id, showtime_id, user_id, expires_at, created_at \
             FROM seat_locks WHERE showtime_id = ? AND seat_id IN ({})",
            sql_placeholders(seat_ids.len())
        );
        let mut query = sqlx::query_as::<_, LockRow>(&sql).bind(showtime_id.to_string());
        for id in seat_ids {
            query = query.bind(id.to_string());
        }
        let rows = query.fetch_all(&mut **tx).await?;
        rows.into_iter().map(LockRow::into_lock).collect()
    }

    /// Delete the caller's own locks on the given seats (renewal and
    /// explicit release both land here).
    pub async fn delete_owned(
        tx: &mut Transaction<'_, Sqlite>,
        showtime_id: Uuid,
        seat_ids: &[Uuid],
        user_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let sql = format!(
            "DELETE FROM seat_locks WHERE showtime_id = ? AND user_id = ? AND seat_id IN ({})",
            sql_placeholders(seat_ids.len())
        );
        let mut query = sqlx::query(&sql)
            .bind(showtime_id.to_string())
            .bind(user_id.to_string());
        for id in seat_ids {
            query = query.bind(id.to_string());
        }
        let result = query.execute(&mut **tx).await?;
        Ok(result.rows_affected())
    }

    pub async fn insert(
        tx: &mut Transaction<'_, Sqlite>,
        lock: &SeatLock,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO seat_locks (id, seat_id, showtime_id, user_id, expires_at, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(lock.id.to_string())
        .bind(lock.seat_id.to_string())
        .bind(lock.showtime_id.to_string())
        .bind(lock.user_id.to_string())
        .bind(lock.expires_at)
        .bind(lock.created_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Seats with a non-expired lock for the showtime, for the availability
    /// snapshot.
    pub async fn active_seat_ids(
        tx: &mut Transaction<'_, Sqlite>,
        showtime_id: Uuid,
        now: i64,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT seat_id FROM seat_locks WHERE showtime_id = ? AND expires_at > ?",
        )
        .bind(showtime_id.to_string())
        .bind(now)
        .fetch_all(&mut **tx)
        .await?;
        rows.iter().map(|s| parse_uuid(s)).collect()
    }

    /// One sweeper batch: delete up to `limit` locks already past expiry.
    /// A single statement, so each batch is its own atomic transaction.
    pub async fn delete_expired_batch(
        pool: &SqlitePool,
        now: i64,
        limit: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM seat_locks WHERE id IN \
             (SELECT id FROM seat_locks WHERE expires_at <= ? LIMIT ?)",
        )
        .bind(now)
        .bind(limit)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
