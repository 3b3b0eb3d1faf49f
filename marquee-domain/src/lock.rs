use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A temporary hold on one seat for one showtime. At most one non-expired
/// lock exists per (seat, showtime); the storage layer enforces this with a
/// unique constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatLock {
    pub id: Uuid,
    pub seat_id: Uuid,
    pub showtime_id: Uuid,
    pub user_id: Uuid,
    pub expires_at: i64, // Unix timestamp
    pub created_at: i64,
}

impl SeatLock {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}
