use marquee_domain::{Seat, SeatType};
use marquee_store::app_config::BusinessRules;

/// Per-seat price: the showtime's base price weighted by the seat type's
/// configured multiplier, rounded to whole cents.
pub fn seat_price_cents(base_price_cents: i64, seat_type: SeatType, rules: &BusinessRules) -> i64 {
    let multiplier = match seat_type {
        SeatType::Regular => 1.0,
        SeatType::Premium => rules.premium_price_multiplier,
        SeatType::Vip => rules.vip_price_multiplier,
    };
    (base_price_cents as f64 * multiplier).round() as i64
}

pub fn total_price_cents(base_price_cents: i64, seats: &[Seat], rules: &BusinessRules) -> i64 {
    seats
        .iter()
        .map(|seat| seat_price_cents(base_price_cents, seat.seat_type, rules))
        .sum()
}
