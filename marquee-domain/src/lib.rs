pub mod lock;
pub mod repository;
pub mod reservation;
pub mod seat;
pub mod showtime;

pub use lock::SeatLock;
pub use reservation::{Reservation, ReservationStatus, ReservedSeat};
pub use seat::{Seat, SeatType};
pub use showtime::Showtime;
