use std::collections::HashSet;
use std::sync::Arc;

use marquee_domain::repository::ShowtimeDirectory;
use marquee_domain::{Seat, Showtime};
use uuid::Uuid;

use crate::error::ReservationError;

/// Shared precondition check for acquire and commit: the seat list is
/// non-empty and duplicate-free, the showtime exists and has not started,
/// and every seat belongs to the showtime's theater.
pub(crate) async fn showtime_and_seats(
    showtimes: &Arc<dyn ShowtimeDirectory>,
    showtime_id: Uuid,
    seat_ids: &[Uuid],
    now: i64,
) -> Result<(Showtime, Vec<Seat>), ReservationError> {
    if seat_ids.is_empty() {
        return Err(ReservationError::InvalidSeats("no seats requested".into()));
    }
    let unique: HashSet<&Uuid> = seat_ids.iter().collect();
    if unique.len() != seat_ids.len() {
        return Err(ReservationError::InvalidSeats("duplicate seat ids".into()));
    }

    let showtime = showtimes
        .get_showtime(showtime_id)
        .await?
        .ok_or(ReservationError::NotFound {
            resource: "showtime",
        })?;
    if showtime.has_started(now) {
        return Err(ReservationError::AlreadyStarted);
    }

    let seats = showtimes
        .seats_by_ids(showtime.theater_id, seat_ids)
        .await?;
    if seats.len() != seat_ids.len() {
        return Err(ReservationError::NotFound { resource: "seat" });
    }

    Ok((showtime, seats))
}
