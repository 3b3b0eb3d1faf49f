mod common;

use chrono::Utc;
use marquee_domain::ReservationStatus;
use marquee_reserve::ReservationError;
use uuid::Uuid;

use common::{force_expire_locks, live_claim_count, lock_count, setup};

#[tokio::test]
async fn commit_converts_locks_into_a_priced_reservation() {
    let env = setup().await;
    let user = Uuid::new_v4();
    let seats = [env.fixture.seat_a1, env.fixture.seat_b2_vip];

    env.locks
        .acquire(env.fixture.showtime_id, &seats, user)
        .await
        .expect("acquire");

    let reservation = env
        .committer
        .commit(env.fixture.showtime_id, &seats, user)
        .await
        .expect("commit");

    assert_eq!(reservation.status, ReservationStatus::Confirmed);
    assert_eq!(reservation.user_id, user);
    // base 1000 for A1 + vip 1000 * 1.5 for B2
    assert_eq!(reservation.total_price_cents, 2500);
    assert_eq!(reservation.seats.len(), 2);

    // Consumed locks are gone; the reservation-seat rows carry the claim.
    assert_eq!(lock_count(&env.db.pool, env.fixture.showtime_id).await, 0);
    assert_eq!(
        live_claim_count(&env.db.pool, env.fixture.showtime_id, env.fixture.seat_a1).await,
        1
    );
}

#[tokio::test]
async fn commit_without_lock_fails() {
    let env = setup().await;
    let user = Uuid::new_v4();

    let err = env
        .committer
        .commit(env.fixture.showtime_id, &[env.fixture.seat_a1], user)
        .await
        .expect_err("no locks held");
    assert!(matches!(err, ReservationError::LockMissing));
}

#[tokio::test]
async fn commit_with_expired_lock_fails() {
    let env = setup().await;
    let user = Uuid::new_v4();

    env.locks
        .acquire(env.fixture.showtime_id, &[env.fixture.seat_a1], user)
        .await
        .expect("acquire");
    force_expire_locks(&env.db.pool, env.fixture.showtime_id).await;

    let err = env
        .committer
        .commit(env.fixture.showtime_id, &[env.fixture.seat_a1], user)
        .await
        .expect_err("expired lock");
    assert!(matches!(err, ReservationError::LockExpired));
}

#[tokio::test]
async fn commit_against_foreign_lock_fails() {
    let env = setup().await;
    let holder = Uuid::new_v4();
    let intruder = Uuid::new_v4();

    env.locks
        .acquire(env.fixture.showtime_id, &[env.fixture.seat_a1], holder)
        .await
        .expect("acquire");

    let err = env
        .committer
        .commit(env.fixture.showtime_id, &[env.fixture.seat_a1], intruder)
        .await
        .expect_err("foreign lock");
    assert!(matches!(err, ReservationError::LockNotOwned));
}

#[tokio::test]
async fn failed_commit_leaves_no_partial_state() {
    let env = setup().await;
    let user = Uuid::new_v4();
    let seats = [env.fixture.seat_a1, env.fixture.seat_a2];

    env.locks
        .acquire(env.fixture.showtime_id, &seats, user)
        .await
        .expect("acquire");

    // Wedge a live claim onto A2 behind the core's back so the second seat
    // insert trips the live-claim unique index mid-transaction.
    let ghost = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO reservations (id, user_id, showtime_id, status, total_price_cents, created_at, updated_at) \
         VALUES (?, ?, ?, 'confirmed', 0, ?, ?)",
    )
    .bind(ghost.to_string())
    .bind(Uuid::new_v4().to_string())
    .bind(env.fixture.showtime_id.to_string())
    .bind(now)
    .bind(now)
    .execute(&env.db.pool)
    .await
    .expect("ghost reservation");
    sqlx::query(
        "INSERT INTO reservation_seats (reservation_id, seat_id, showtime_id, active) VALUES (?, ?, ?, 1)",
    )
    .bind(ghost.to_string())
    .bind(env.fixture.seat_a2.to_string())
    .bind(env.fixture.showtime_id.to_string())
    .execute(&env.db.pool)
    .await
    .expect("ghost claim");

    let err = env
        .committer
        .commit(env.fixture.showtime_id, &seats, user)
        .await
        .expect_err("commit must fail on the wedged seat");
    assert!(matches!(err, ReservationError::SeatUnavailable { .. }));

    // Nothing of the failed attempt persists: no claim on A1, and the
    // caller's locks were not consumed.
    assert_eq!(
        live_claim_count(&env.db.pool, env.fixture.showtime_id, env.fixture.seat_a1).await,
        0
    );
    assert_eq!(lock_count(&env.db.pool, env.fixture.showtime_id).await, 2);
}

#[tokio::test]
async fn booked_then_cancelled_seats_cycle_through_availability() {
    let env = setup().await;
    let u1 = Uuid::new_v4();
    let u2 = Uuid::new_v4();
    let seats = [env.fixture.seat_a1, env.fixture.seat_a2];

    env.locks
        .acquire(env.fixture.showtime_id, &seats, u1)
        .await
        .expect("acquire");
    let reservation = env
        .committer
        .commit(env.fixture.showtime_id, &seats, u1)
        .await
        .expect("commit");
    assert_eq!(reservation.total_price_cents, 2000);

    let map = env
        .availability
        .seat_map(env.fixture.showtime_id)
        .await
        .expect("seat map");
    for seat in &map.seats {
        if seats.contains(&seat.seat_id) {
            assert!(!seat.is_available);
            assert!(!seat.is_locked);
        }
    }
    assert_eq!(map.available_seats, 2);

    let err = env
        .locks
        .acquire(env.fixture.showtime_id, &[env.fixture.seat_a1], u2)
        .await
        .expect_err("booked seat cannot be locked");
    assert!(matches!(err, ReservationError::SeatUnavailable { .. }));

    env.committer
        .cancel(reservation.id, Some(u1))
        .await
        .expect("cancel");

    let map = env
        .availability
        .seat_map(env.fixture.showtime_id)
        .await
        .expect("seat map after cancel");
    assert_eq!(map.available_seats, 4);

    env.locks
        .acquire(env.fixture.showtime_id, &[env.fixture.seat_a1], u2)
        .await
        .expect("seat is bookable again");
}

#[tokio::test]
async fn locked_seats_show_locked_in_the_seat_map() {
    let env = setup().await;
    let user = Uuid::new_v4();

    env.locks
        .acquire(env.fixture.showtime_id, &[env.fixture.seat_b1_premium], user)
        .await
        .expect("acquire");

    let map = env
        .availability
        .seat_map(env.fixture.showtime_id)
        .await
        .expect("seat map");
    assert_eq!(map.total_seats, 4);
    assert_eq!(map.available_seats, 3);

    let locked_seat = map
        .seats
        .iter()
        .find(|s| s.seat_id == env.fixture.seat_b1_premium)
        .expect("seat present");
    assert!(locked_seat.is_locked);
    assert!(!locked_seat.is_available);
    assert_eq!(locked_seat.seat_label, "B1");
}

#[tokio::test]
async fn cancel_after_start_is_rejected() {
    let env = setup().await;
    let user = Uuid::new_v4();
    let seats = [env.fixture.seat_a1];

    env.locks
        .acquire(env.fixture.showtime_id, &seats, user)
        .await
        .expect("acquire");
    let reservation = env
        .committer
        .commit(env.fixture.showtime_id, &seats, user)
        .await
        .expect("commit");

    // The showtime starts while the user hesitates.
    sqlx::query("UPDATE showtimes SET start_time = ? WHERE id = ?")
        .bind(Utc::now().timestamp() - 10)
        .bind(env.fixture.showtime_id.to_string())
        .execute(&env.db.pool)
        .await
        .expect("backdate showtime");

    let err = env
        .committer
        .cancel(reservation.id, Some(user))
        .await
        .expect_err("started showtime");
    assert!(matches!(err, ReservationError::AlreadyStarted));
}

#[tokio::test]
async fn cancel_is_owner_or_admin_only_and_single_shot() {
    let env = setup().await;
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let seats = [env.fixture.seat_a1];

    env.locks
        .acquire(env.fixture.showtime_id, &seats, owner)
        .await
        .expect("acquire");
    let reservation = env
        .committer
        .commit(env.fixture.showtime_id, &seats, owner)
        .await
        .expect("commit");

    let err = env
        .committer
        .cancel(reservation.id, Some(stranger))
        .await
        .expect_err("stranger cancel");
    assert!(matches!(err, ReservationError::NotOwned));

    // Admin scope (no owner filter) may cancel anyone's reservation.
    env.committer
        .cancel(reservation.id, None)
        .await
        .expect("admin cancel");

    let err = env
        .committer
        .cancel(reservation.id, Some(owner))
        .await
        .expect_err("second cancel");
    assert!(matches!(err, ReservationError::AlreadyCancelled));

    let err = env
        .committer
        .cancel(Uuid::new_v4(), Some(owner))
        .await
        .expect_err("unknown id");
    assert!(matches!(err, ReservationError::NotFound { .. }));
}

#[tokio::test]
async fn listing_hides_started_showtimes_by_default() {
    let env = setup().await;
    let user = Uuid::new_v4();
    let seats = [env.fixture.seat_a1];

    env.locks
        .acquire(env.fixture.showtime_id, &seats, user)
        .await
        .expect("acquire");
    let reservation = env
        .committer
        .commit(env.fixture.showtime_id, &seats, user)
        .await
        .expect("commit");

    let current = env
        .committer
        .list_for_user(user, false)
        .await
        .expect("list");
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].id, reservation.id);
    assert_eq!(current[0].seats.len(), 1);

    sqlx::query("UPDATE showtimes SET start_time = ? WHERE id = ?")
        .bind(Utc::now().timestamp() - 10)
        .bind(env.fixture.showtime_id.to_string())
        .execute(&env.db.pool)
        .await
        .expect("backdate showtime");

    assert!(env
        .committer
        .list_for_user(user, false)
        .await
        .expect("list")
        .is_empty());
    assert_eq!(
        env.committer
            .list_for_user(user, true)
            .await
            .expect("list all")
            .len(),
        1
    );
}

#[tokio::test]
async fn get_enforces_ownership_scope() {
    let env = setup().await;
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let seats = [env.fixture.seat_a2];

    env.locks
        .acquire(env.fixture.showtime_id, &seats, owner)
        .await
        .expect("acquire");
    let reservation = env
        .committer
        .commit(env.fixture.showtime_id, &seats, owner)
        .await
        .expect("commit");

    assert!(env.committer.get(reservation.id, Some(owner)).await.is_ok());
    assert!(env.committer.get(reservation.id, None).await.is_ok());
    assert!(matches!(
        env.committer.get(reservation.id, Some(stranger)).await,
        Err(ReservationError::NotOwned)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_commits_book_the_seat_once() {
    let env = setup().await;
    let user = Uuid::new_v4();
    let showtime_id = env.fixture.showtime_id;
    let seat = env.fixture.seat_a1;

    env.locks
        .acquire(showtime_id, &[seat], user)
        .await
        .expect("acquire");

    // Double-submit storm: the holder fires the same commit 6 times at once.
    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..6 {
        let committer = env.committer.clone();
        tasks.spawn(async move { committer.commit(showtime_id, &[seat], user).await });
    }

    let mut confirmed = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.expect("task panicked") {
            Ok(_) => confirmed += 1,
            Err(
                ReservationError::LockMissing | ReservationError::SeatUnavailable { .. },
            ) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(confirmed, 1);
    assert_eq!(live_claim_count(&env.db.pool, showtime_id, seat).await, 1);
}
