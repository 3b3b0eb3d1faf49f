/// Idempotent schema bootstrap, executed at startup.
///
/// The two constraints doing the heavy lifting for the reservation core:
/// `seat_locks` is UNIQUE on (seat_id, showtime_id), and live
/// `reservation_seats` rows carry a partial unique index on the same pair.
/// Cancelled reservations keep their seat rows (active = 0) for audit
/// without counting as occupancy.
pub fn create_tables_sql() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS theaters (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS seats (
        id TEXT PRIMARY KEY NOT NULL,
        theater_id TEXT NOT NULL REFERENCES theaters(id) ON DELETE CASCADE,
        row_label TEXT NOT NULL,
        seat_number INTEGER NOT NULL,
        seat_type TEXT NOT NULL DEFAULT 'regular',
        UNIQUE (theater_id, row_label, seat_number)
    );

    CREATE TABLE IF NOT EXISTS showtimes (
        id TEXT PRIMARY KEY NOT NULL,
        theater_id TEXT NOT NULL REFERENCES theaters(id) ON DELETE CASCADE,
        start_time INTEGER NOT NULL,
        end_time INTEGER NOT NULL,
        base_price_cents INTEGER NOT NULL,
        CHECK (end_time > start_time)
    );

    CREATE TABLE IF NOT EXISTS seat_locks (
        id TEXT PRIMARY KEY NOT NULL,
        seat_id TEXT NOT NULL REFERENCES seats(id) ON DELETE CASCADE,
        showtime_id TEXT NOT NULL REFERENCES showtimes(id) ON DELETE CASCADE,
        user_id TEXT NOT NULL,
        expires_at INTEGER NOT NULL,
        created_at INTEGER NOT NULL,
        UNIQUE (seat_id, showtime_id)
    );

    CREATE INDEX IF NOT EXISTS idx_seat_locks_expires_at ON seat_locks (expires_at);
    CREATE INDEX IF NOT EXISTS idx_seat_locks_user ON seat_locks (user_id);

    CREATE TABLE IF NOT EXISTS reservations (
        id TEXT PRIMARY KEY NOT NULL,
        user_id TEXT NOT NULL,
        showtime_id TEXT NOT NULL REFERENCES showtimes(id) ON DELETE CASCADE,
        status TEXT NOT NULL DEFAULT 'confirmed',
        total_price_cents INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_reservations_user ON reservations (user_id);
    CREATE INDEX IF NOT EXISTS idx_reservations_showtime ON reservations (showtime_id);

    CREATE TABLE IF NOT EXISTS reservation_seats (
        reservation_id TEXT NOT NULL REFERENCES reservations(id) ON DELETE CASCADE,
        seat_id TEXT NOT NULL REFERENCES seats(id) ON DELETE CASCADE,
        showtime_id TEXT NOT NULL REFERENCES showtimes(id) ON DELETE CASCADE,
        active INTEGER NOT NULL DEFAULT 1,
        PRIMARY KEY (reservation_id, seat_id)
    );

    CREATE UNIQUE INDEX IF NOT EXISTS uq_live_reservation_seat
        ON reservation_seats (seat_id, showtime_id) WHERE active = 1;
    "#
}
