pub mod app_config;
pub mod database;
pub mod lock_repo;
pub mod reservation_repo;
pub mod schema;
pub mod showtime_repo;
pub mod testing;

pub use database::Db;
pub use lock_repo::LockRepository;
pub use reservation_repo::ReservationRepository;
pub use showtime_repo::StoreShowtimeRepository;

use uuid::Uuid;

/// "?, ?, ?" for runtime-built IN clauses.
pub(crate) fn sql_placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, sqlx::Error> {
    Uuid::parse_str(s).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}
