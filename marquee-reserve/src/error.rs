use thiserror::Error;
use uuid::Uuid;

/// Everything the reservation core can fail with. All variants except
/// `Store` are caller-recoverable through the defined retry path: re-query
/// availability, re-lock, re-commit. `Store` is the generic transient bucket
/// (store unreachable, pool exhausted) meant for caller-side backoff, not
/// business branching.
#[derive(Debug, Error)]
pub enum ReservationError {
    /// Lost the race for one or more seats; the conflicting ids are named.
    #[error("seats unavailable: {seat_ids:?}")]
    SeatUnavailable { seat_ids: Vec<Uuid> },

    #[error("no seat lock held for one or more requested seats")]
    LockMissing,

    #[error("seat lock has expired")]
    LockExpired,

    #[error("seat lock is held by another user")]
    LockNotOwned,

    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    #[error("reservation belongs to another user")]
    NotOwned,

    #[error("showtime has already started")]
    AlreadyStarted,

    #[error("reservation is already cancelled")]
    AlreadyCancelled,

    #[error("invalid seat selection: {0}")]
    InvalidSeats(String),

    #[error("storage error: {0}")]
    Store(String),
}

impl From<sqlx::Error> for ReservationError {
    fn from(e: sqlx::Error) -> Self {
        ReservationError::Store(e.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for ReservationError {
    fn from(e: Box<dyn std::error::Error + Send + Sync>) -> Self {
        ReservationError::Store(e.to_string())
    }
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// SQLITE_BUSY / SQLITE_LOCKED, plain or extended. Surfacing after the
/// bounded busy timeout means we lost the serialization race.
pub(crate) fn is_lock_contention(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => matches!(
            db.code().as_deref(),
            Some("5") | Some("6") | Some("261") | Some("517")
        ),
        _ => false,
    }
}

/// Conflicting concurrent writes are a defined loss, not an infrastructure
/// failure: the caller re-queries availability and retries.
pub(crate) fn map_conflict(e: sqlx::Error, seat_ids: &[Uuid]) -> ReservationError {
    if is_unique_violation(&e) || is_lock_contention(&e) {
        ReservationError::SeatUnavailable {
            seat_ids: seat_ids.to_vec(),
        }
    } else {
        e.into()
    }
}
