use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Showtime {
    pub id: Uuid,
    pub theater_id: Uuid,
    pub start_time: i64, // Unix timestamp
    pub end_time: i64,
    pub base_price_cents: i64,
}

impl Showtime {
    pub fn has_started(&self, now: i64) -> bool {
        self.start_time <= now
    }
}
