//! Cooldown Timer Service
//!
//! Owns one flow's rate-limit cooldown: an absolute deadline persisted to
//! tab storage, a 250 ms countdown task, and tick/expiry events for the
//! UI layer. One instance per flow; the deadline key pair keeps the
//! password-reset and verification-resend cooldowns independent.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::config::CooldownSettings;
use crate::domain::{remaining_seconds, sanitize_duration_secs, CooldownReason, CooldownSnapshot};
use crate::infrastructure::storage::{keys, read_epoch_ms, TabStorage};

/// Persistence key pair for one flow's cooldown.
#[derive(Debug, Clone, Copy)]
pub struct CooldownKeys {
    /// Absolute epoch-ms deadline, stored as a decimal string.
    pub deadline: &'static str,
    /// Optional reason marker; absent when the reason is `None`.
    pub reason: &'static str,
}

impl CooldownKeys {
    /// Keys of the password-reset-request flow.
    pub fn password_reset() -> Self {
        Self {
            deadline: keys::FORGOT_COOLDOWN_UNTIL,
            reason: keys::FORGOT_COOLDOWN_REASON,
        }
    }

    /// Keys of the verification-resend flow.
    pub fn verification() -> Self {
        Self {
            deadline: keys::VERIFY_COOLDOWN_UNTIL,
            reason: keys::VERIFY_COOLDOWN_REASON,
        }
    }
}

/// Events emitted to UI subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownEvent {
    /// Countdown update; `remaining_seconds` is zero on the final tick.
    Tick {
        remaining_seconds: u64,
        reason: CooldownReason,
    },
    /// The deadline passed: persisted state cleared, controls may re-enable.
    /// Emitted exactly once per countdown.
    Expired,
    /// The cooldown was cancelled out-of-band (e.g. verification completed).
    Cleared,
}

/// Per-flow cooldown timer.
///
/// `start` while running always cancels and replaces the prior schedule,
/// so at most one countdown task exists per instance.
pub struct CooldownTimer {
    storage: Arc<dyn TabStorage>,
    keys: CooldownKeys,
    settings: CooldownSettings,
    snapshot: Arc<Mutex<CooldownSnapshot>>,
    events: broadcast::Sender<CooldownEvent>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl CooldownTimer {
    pub fn new(storage: Arc<dyn TabStorage>, keys: CooldownKeys, settings: CooldownSettings) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            storage,
            keys,
            settings,
            snapshot: Arc::new(Mutex::new(CooldownSnapshot::idle())),
            events,
            task: Mutex::new(None),
        }
    }

    /// Subscribe to tick/expiry events. Late subscribers only see events
    /// emitted after this call; `snapshot` covers the current state.
    pub fn subscribe(&self) -> broadcast::Receiver<CooldownEvent> {
        self.events.subscribe()
    }

    /// Latest observable state.
    pub fn snapshot(&self) -> CooldownSnapshot {
        *self.snapshot.lock()
    }

    pub fn is_active(&self) -> bool {
        self.snapshot().is_active()
    }

    /// Persisted deadline, if one is stored and parseable.
    pub fn persisted_deadline_ms(&self) -> Option<i64> {
        read_epoch_ms(&*self.storage, self.keys.deadline)
    }

    /// Begin a countdown toward an absolute deadline.
    ///
    /// Persists the deadline immediately, then ticks every
    /// `tick_interval_ms` until expiry. The snapshot is updated before
    /// this returns, so `is_active` is correct right away.
    pub fn start(&self, resume_at_epoch_ms: i64, reason: CooldownReason) {
        self.storage
            .set(self.keys.deadline, &resume_at_epoch_ms.to_string());
        if reason == CooldownReason::None {
            self.storage.remove(self.keys.reason);
        } else {
            self.storage.set(self.keys.reason, reason.as_storage_str());
        }

        self.stop_task();

        let now_ms = Utc::now().timestamp_millis();
        *self.snapshot.lock() = CooldownSnapshot {
            remaining_seconds: remaining_seconds(resume_at_epoch_ms, now_ms),
            reason,
        };

        // The countdown itself runs on the monotonic clock; the epoch
        // deadline exists only so a reload can recompute remaining time.
        let left_ms = resume_at_epoch_ms.saturating_sub(now_ms).max(0) as u64;
        let deadline = Instant::now() + Duration::from_millis(left_ms);
        let tick_every = Duration::from_millis(self.settings.tick_interval_ms);

        let storage = Arc::clone(&self.storage);
        let snapshot = Arc::clone(&self.snapshot);
        let events = self.events.clone();
        let timer_keys = self.keys;

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(tick_every);
            loop {
                ticker.tick().await;
                let left = deadline.saturating_duration_since(Instant::now());
                let remaining = (left.as_millis() as u64).div_ceil(1000);
                if remaining == 0 {
                    storage.remove(timer_keys.deadline);
                    storage.remove(timer_keys.reason);
                    *snapshot.lock() = CooldownSnapshot::idle();
                    let _ = events.send(CooldownEvent::Tick {
                        remaining_seconds: 0,
                        reason,
                    });
                    let _ = events.send(CooldownEvent::Expired);
                    tracing::debug!(key = timer_keys.deadline, "cooldown expired");
                    break;
                }
                *snapshot.lock() = CooldownSnapshot {
                    remaining_seconds: remaining,
                    reason,
                };
                let _ = events.send(CooldownEvent::Tick {
                    remaining_seconds: remaining,
                    reason,
                });
            }
        });
        *self.task.lock() = Some(handle);

        tracing::debug!(
            key = self.keys.deadline,
            resume_at_epoch_ms,
            ?reason,
            "cooldown started"
        );
    }

    /// The server told us to wait: compute the deadline from now and start.
    ///
    /// Absent/zero durations fall back to the configured default, oversized
    /// ones are clamped. Returns the seconds actually applied.
    pub fn apply_duration(&self, advertised_secs: Option<u64>, reason: CooldownReason) -> u64 {
        let secs = sanitize_duration_secs(
            advertised_secs,
            self.settings.fallback_seconds,
            self.settings.max_seconds,
        );
        let resume_at = Utc::now().timestamp_millis() + (secs as i64) * 1000;
        self.start(resume_at, reason);
        secs
    }

    /// Resume a persisted countdown after a page (re)load.
    ///
    /// A future deadline restarts the countdown with its stored reason; a
    /// past, absent, or unparseable one clears the persisted state and
    /// leaves the timer idle. Returns whether a countdown resumed.
    pub fn restore(&self) -> bool {
        let reason = self
            .storage
            .get(self.keys.reason)
            .map(|raw| CooldownReason::from_storage_str(&raw))
            .unwrap_or_default();

        match self.persisted_deadline_ms() {
            Some(ms) if ms > Utc::now().timestamp_millis() => {
                self.start(ms, reason);
                true
            }
            _ => {
                self.storage.remove(self.keys.deadline);
                self.storage.remove(self.keys.reason);
                *self.snapshot.lock() = CooldownSnapshot::idle();
                false
            }
        }
    }

    /// Submit gate: when a persisted deadline is still in the future,
    /// resume its countdown and report the remaining seconds so the caller
    /// can refuse the action without touching the network.
    pub fn gate(&self) -> Option<u64> {
        let ms = self.persisted_deadline_ms()?;
        let now_ms = Utc::now().timestamp_millis();
        if ms <= now_ms {
            return None;
        }
        self.restore();
        Some(remaining_seconds(ms, now_ms))
    }

    /// Stop ticking and clear persisted state unconditionally. Used when an
    /// unrelated success makes the cooldown moot.
    pub fn cancel(&self) {
        self.stop_task();
        self.storage.remove(self.keys.deadline);
        self.storage.remove(self.keys.reason);
        *self.snapshot.lock() = CooldownSnapshot::idle();
        let _ = self.events.send(CooldownEvent::Cleared);
    }

    fn stop_task(&self) {
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for CooldownTimer {
    fn drop(&mut self) {
        self.stop_task();
    }
}
