use async_trait::async_trait;
use std::error::Error;
use uuid::Uuid;

use crate::seat::Seat;
use crate::showtime::Showtime;

/// Read-side contract for showtime and seat-inventory lookups. Showtimes and
/// seats are owned by the scheduling/catalog side; the reservation core only
/// ever reads them.
#[async_trait]
pub trait ShowtimeDirectory: Send + Sync {
    async fn get_showtime(
        &self,
        id: Uuid,
    ) -> Result<Option<Showtime>, Box<dyn Error + Send + Sync>>;

    async fn list_seats(
        &self,
        theater_id: Uuid,
    ) -> Result<Vec<Seat>, Box<dyn Error + Send + Sync>>;

    /// Fetch the subset of `seat_ids` that exist in `theater_id`. Callers
    /// compare the result length against the request to detect unknown seats.
    async fn seats_by_ids(
        &self,
        theater_id: Uuid,
        seat_ids: &[Uuid],
    ) -> Result<Vec<Seat>, Box<dyn Error + Send + Sync>>;
}
