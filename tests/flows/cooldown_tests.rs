//! Cooldown Flow Tests
//!
//! Countdown ticking, persistence across re-instantiated timers, and
//! degraded operation when the tab store rejects writes.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use pretty_assertions::assert_eq;

use chat_client::application::services::{CooldownEvent, CooldownKeys, CooldownTimer};
use chat_client::domain::CooldownReason;
use chat_client::infrastructure::storage::{keys, MemoryStorage, TabStorage};

use crate::common::{test_settings, FlakyStorage};

fn timer(storage: Arc<dyn TabStorage>, keys: CooldownKeys) -> CooldownTimer {
    CooldownTimer::new(storage, keys, test_settings().cooldown)
}

#[tokio::test(start_paused = true)]
async fn countdown_ticks_down_and_expires_exactly_once() {
    let storage: Arc<dyn TabStorage> = Arc::new(MemoryStorage::new());
    let timer = timer(Arc::clone(&storage), CooldownKeys::verification());
    let mut events = timer.subscribe();

    assert_eq!(timer.apply_duration(Some(1), CooldownReason::None), 1);
    assert!(timer.is_active());
    assert!(storage.get(keys::VERIFY_COOLDOWN_UNTIL).is_some());

    let started = tokio::time::Instant::now();
    let mut ticks = Vec::new();
    let mut expirations = 0;
    loop {
        match events.recv().await.expect("event channel open") {
            CooldownEvent::Tick {
                remaining_seconds, ..
            } => ticks.push(remaining_seconds),
            CooldownEvent::Expired => {
                expirations += 1;
                break;
            }
            CooldownEvent::Cleared => panic!("countdown was not cancelled"),
        }
    }
    // A one-second cooldown must finish within one tick past its deadline.
    assert!(started.elapsed() <= Duration::from_millis(1_250));
    // Give the clock room for a late duplicate; none may arrive.
    tokio::time::sleep(Duration::from_secs(1)).await;
    while let Ok(event) = events.try_recv() {
        assert!(
            !matches!(event, CooldownEvent::Expired),
            "expiry must fire exactly once"
        );
    }

    assert_eq!(expirations, 1);
    assert_eq!(ticks.first().copied(), Some(1));
    assert_eq!(ticks.last().copied(), Some(0));
    assert!(ticks.windows(2).all(|w| w[0] >= w[1]), "ticks never increase");

    assert!(!timer.is_active());
    assert_eq!(storage.get(keys::VERIFY_COOLDOWN_UNTIL), None);
    assert_eq!(storage.get(keys::VERIFY_COOLDOWN_REASON), None);
}

#[tokio::test(start_paused = true)]
async fn restart_replaces_the_previous_countdown() {
    let storage: Arc<dyn TabStorage> = Arc::new(MemoryStorage::new());
    let timer = timer(Arc::clone(&storage), CooldownKeys::verification());

    timer.apply_duration(Some(300), CooldownReason::RateLimited);
    // A new duration supersedes the running countdown entirely.
    timer.apply_duration(Some(1), CooldownReason::None);
    let mut events = timer.subscribe();

    let mut expirations = 0;
    loop {
        match events.recv().await.expect("event channel open") {
            CooldownEvent::Tick {
                remaining_seconds, ..
            } => assert!(remaining_seconds <= 1, "old countdown still ticking"),
            CooldownEvent::Expired => {
                expirations += 1;
                break;
            }
            CooldownEvent::Cleared => panic!("countdown was not cancelled"),
        }
    }
    assert_eq!(expirations, 1);
    assert!(!timer.is_active());
}

#[tokio::test(start_paused = true)]
async fn persisted_deadline_survives_a_new_timer_instance() {
    let storage: Arc<dyn TabStorage> = Arc::new(MemoryStorage::new());

    let first = timer(Arc::clone(&storage), CooldownKeys::password_reset());
    let applied = first.apply_duration(Some(120), CooldownReason::RateLimited);
    assert_eq!(applied, 120);
    drop(first);

    // Same keys, fresh instance, as a reloaded page would build.
    let second = timer(Arc::clone(&storage), CooldownKeys::password_reset());
    assert!(second.restore());

    let snapshot = second.snapshot();
    assert_eq!(snapshot.reason, CooldownReason::RateLimited);
    assert!(snapshot.remaining_seconds > 0 && snapshot.remaining_seconds <= 120);
    assert!(second.gate().is_some());
}

#[tokio::test(start_paused = true)]
async fn stale_persisted_state_is_cleared_on_restore() {
    let storage: Arc<dyn TabStorage> = Arc::new(MemoryStorage::new());
    let past = Utc::now().timestamp_millis() - 5_000;
    storage.set(keys::FORGOT_COOLDOWN_UNTIL, &past.to_string());
    storage.set(keys::FORGOT_COOLDOWN_REASON, "rate");

    let timer = timer(Arc::clone(&storage), CooldownKeys::password_reset());
    assert!(!timer.restore());
    assert!(!timer.is_active());
    assert_eq!(storage.get(keys::FORGOT_COOLDOWN_UNTIL), None);
    assert_eq!(storage.get(keys::FORGOT_COOLDOWN_REASON), None);
}

#[tokio::test(start_paused = true)]
async fn oversized_advertised_duration_is_clamped() {
    let storage: Arc<dyn TabStorage> = Arc::new(MemoryStorage::new());
    let timer = timer(storage, CooldownKeys::verification());

    assert_eq!(timer.apply_duration(Some(10_000), CooldownReason::RateLimited), 600);
    assert_eq!(timer.snapshot().remaining_seconds, 600);
}

#[tokio::test(start_paused = true)]
async fn countdown_runs_in_memory_when_writes_fail() {
    let flaky = FlakyStorage::new();
    flaky.fail_writes(true);
    let timer = timer(
        Arc::clone(&flaky) as Arc<dyn TabStorage>,
        CooldownKeys::verification(),
    );

    // Persistence is lost but the current page still counts down.
    assert_eq!(timer.apply_duration(None, CooldownReason::RateLimited), 60);
    assert!(timer.is_active());
    assert_eq!(timer.persisted_deadline_ms(), None);

    tokio::time::sleep(Duration::from_secs(2)).await;
    let snapshot = timer.snapshot();
    assert!(snapshot.is_active());
    assert!(snapshot.remaining_seconds <= 58);
}
