use std::sync::Arc;

use marquee_domain::repository::ShowtimeDirectory;
use marquee_reserve::{AvailabilityResolver, LockManager, ReservationCommitter};
use marquee_store::app_config::BusinessRules;
use marquee_store::{Db, StoreShowtimeRepository};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub availability: Arc<AvailabilityResolver>,
    pub locks: Arc<LockManager>,
    pub reservations: Arc<ReservationCommitter>,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn build(db: Db, auth: AuthConfig, rules: BusinessRules) -> Self {
        let showtimes: Arc<dyn ShowtimeDirectory> =
            Arc::new(StoreShowtimeRepository::new(db.pool.clone()));

        let availability = Arc::new(AvailabilityResolver::new(
            db.pool.clone(),
            showtimes.clone(),
        ));
        let locks = Arc::new(LockManager::new(db.pool.clone(), showtimes.clone(), &rules));
        let reservations = Arc::new(ReservationCommitter::new(
            db.pool.clone(),
            showtimes,
            rules,
        ));

        Self {
            db,
            availability,
            locks,
            reservations,
            auth,
        }
    }
}
