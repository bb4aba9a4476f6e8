//! Session Heartbeat Service
//!
//! Polls the liveness endpoint on a jittered interval and drives the
//! one-shot session-expired notice. The pure transition logic lives in
//! [`crate::domain::session`]; this service adds scheduling, the
//! visibility gate, and the hook side effects.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::Rng;
use tokio::task::JoinHandle;

use crate::application::services::PageHooks;
use crate::config::HeartbeatSettings;
use crate::domain::{ChatAccess, ProbeOutcome, SessionEffect, SessionFlags, SessionPhase};
use crate::infrastructure::api::AuthApi;
use crate::shared::error::ApiError;

/// Notice text for the one-shot expiry notification.
pub const SESSION_EXPIRED_NOTICE: &str =
    "You have been signed out or your session has expired. Please sign in again to continue.";

/// Whether the page is currently the visible/foreground one. Probes are
/// skipped entirely while hidden.
pub trait PageVisibility: Send + Sync {
    fn is_visible(&self) -> bool;
}

/// Visibility provider for embeddings without a visibility signal.
pub struct AlwaysVisible;

impl PageVisibility for AlwaysVisible {
    fn is_visible(&self) -> bool {
        true
    }
}

/// Shared flag the embedding flips on visibility changes.
#[derive(Debug)]
pub struct VisibilityFlag {
    visible: AtomicBool,
}

impl VisibilityFlag {
    pub fn new(initially_visible: bool) -> Self {
        Self {
            visible: AtomicBool::new(initially_visible),
        }
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Relaxed);
    }
}

impl PageVisibility for VisibilityFlag {
    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Relaxed)
    }
}

struct HeartbeatInner {
    api: Arc<dyn AuthApi>,
    hooks: Arc<dyn PageHooks>,
    visibility: Arc<dyn PageVisibility>,
    settings: HeartbeatSettings,
    flags: Mutex<SessionFlags>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl HeartbeatInner {
    fn cancel_schedule(&self) {
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
        }
    }

    /// Apply one probe outcome and run its effect. The lock is released
    /// before the hooks run; a superseded response arriving afterwards is
    /// rejected by the state machine, not by the caller.
    fn apply(&self, outcome: ProbeOutcome) {
        let effect = self.flags.lock().observe(outcome);
        if let Some(SessionEffect::Invalidated) = effect {
            self.cancel_schedule();
            self.hooks.chat_access_changed(ChatAccess::Guest);
            self.hooks.session_invalidated(SESSION_EXPIRED_NOTICE);
            tracing::info!("session invalidated by liveness check");
        }
    }

    async fn probe_once(&self) {
        if !self.visibility.is_visible() {
            tracing::trace!("page hidden, skipping liveness probe");
            return;
        }
        let outcome = match self.api.fetch_me().await {
            Ok(_) => ProbeOutcome::Success,
            Err(ApiError::Unauthenticated) => ProbeOutcome::Unauthenticated,
            Err(e) => {
                tracing::debug!(error = %e, "liveness probe absorbed non-authoritative failure");
                ProbeOutcome::Errored
            }
        };
        self.apply(outcome);
    }
}

impl Drop for HeartbeatInner {
    fn drop(&mut self) {
        self.cancel_schedule();
    }
}

/// Session liveness heartbeat for one page context.
#[derive(Clone)]
pub struct SessionHeartbeat {
    inner: Arc<HeartbeatInner>,
}

impl SessionHeartbeat {
    pub fn new(
        api: Arc<dyn AuthApi>,
        hooks: Arc<dyn PageHooks>,
        visibility: Arc<dyn PageVisibility>,
        settings: HeartbeatSettings,
    ) -> Self {
        Self {
            inner: Arc::new(HeartbeatInner {
                api,
                hooks,
                visibility,
                settings,
                flags: Mutex::new(SessionFlags::new()),
                task: Mutex::new(None),
            }),
        }
    }

    /// Schedule recurring probes: first after `base + jitter` (jitter
    /// uniform, avoids synchronized probes across many open tabs), then
    /// every `base`. Always cancels a prior schedule first.
    pub fn start(&self) {
        self.inner.cancel_schedule();

        let base = Duration::from_secs(self.inner.settings.base_interval_secs);
        let jitter_ms = rand::rng().random_range(0..=self.inner.settings.startup_jitter_secs * 1000);
        let first_delay = base + Duration::from_millis(jitter_ms);

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(first_delay).await;
            // Fixed cadence: a slow probe must not push back the next one.
            let mut ticker = tokio::time::interval(base);
            loop {
                ticker.tick().await;
                inner.probe_once().await;
                if inner.flags.lock().phase() == SessionPhase::Invalid {
                    break;
                }
            }
        });
        *self.inner.task.lock() = Some(handle);
        tracing::debug!(first_delay_ms = first_delay.as_millis() as u64, "heartbeat scheduled");
    }

    /// Cancel any pending or recurring probe. Idempotent.
    pub fn stop(&self) {
        self.inner.cancel_schedule();
    }

    /// Run one liveness check now (still subject to the visibility gate).
    pub async fn probe_once(&self) {
        self.inner.probe_once().await;
    }

    /// Page returned to the foreground: probe immediately and restart the
    /// recurring schedule, but only while an authenticated session is the
    /// last known state and no notice has been shown.
    pub async fn on_visible(&self) {
        let (had_session, shown) = {
            let flags = self.inner.flags.lock();
            (flags.had_valid_session(), flags.notice_shown())
        };
        if !had_session || shown {
            return;
        }
        self.inner.probe_once().await;
        if self.inner.flags.lock().phase() != SessionPhase::Invalid {
            self.start();
        }
    }

    /// Record a successful liveness check performed outside the schedule
    /// (the page's initial auth guard probe).
    pub fn note_authenticated(&self) {
        let _ = self.inner.flags.lock().observe(ProbeOutcome::Success);
    }

    /// Record an explicit unauthenticated answer observed outside the
    /// schedule (e.g. a 401 from the chat endpoint). Runs the same
    /// one-shot invalidation path as a scheduled probe.
    pub fn observe_unauthenticated(&self) {
        self.inner.apply(ProbeOutcome::Unauthenticated);
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.flags.lock().phase()
    }

    pub fn had_valid_session(&self) -> bool {
        self.inner.flags.lock().had_valid_session()
    }

    pub fn notice_shown(&self) -> bool {
        self.inner.flags.lock().notice_shown()
    }
}
