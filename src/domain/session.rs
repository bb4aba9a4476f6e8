//! Session Liveness State Machine
//!
//! Tracks whether this page ever observed a valid session and latches the
//! one-shot "session expired" notice. Probes resolve to a [`ProbeOutcome`];
//! [`SessionFlags::observe`] is the only transition function.

/// Lifetime phases of the page's view of the session.
///
/// `Invalid` is terminal for the page's lifetime; recovering requires a
/// full reload and re-login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No successful liveness check yet. An unauthenticated answer here is
    /// the normal state for a visitor, not a logout.
    Unauthenticated,
    /// At least one liveness check succeeded.
    Authenticated,
    /// The server explicitly invalidated a previously-seen session.
    Invalid,
}

/// Result of a single liveness probe, already classified by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The liveness endpoint confirmed a valid session.
    Success,
    /// The liveness endpoint answered with an explicit unauthenticated
    /// status.
    Unauthenticated,
    /// Transport failure or unparseable response. Never evidence of logout.
    Errored,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEffect {
    /// Fire the one-shot expiry notice and revert session-dependent UI.
    Invalidated,
}

/// Heartbeat flags owned by one page context.
#[derive(Debug, Clone)]
pub struct SessionFlags {
    phase: SessionPhase,
    notice_shown: bool,
}

impl Default for SessionFlags {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionFlags {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Unauthenticated,
            notice_shown: false,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// True once the first successful liveness check happened, until the
    /// session is invalidated.
    pub fn had_valid_session(&self) -> bool {
        self.phase == SessionPhase::Authenticated
    }

    pub fn notice_shown(&self) -> bool {
        self.notice_shown
    }

    /// Apply one probe outcome. Returns the effect the caller must run,
    /// at most once per page life.
    ///
    /// A superseded in-flight response arriving after invalidation hits the
    /// `Invalid` arm and is ignored.
    pub fn observe(&mut self, outcome: ProbeOutcome) -> Option<SessionEffect> {
        match (self.phase, outcome) {
            (_, ProbeOutcome::Errored) => None,
            (SessionPhase::Invalid, _) => None,
            (_, ProbeOutcome::Success) => {
                self.phase = SessionPhase::Authenticated;
                None
            }
            (SessionPhase::Unauthenticated, ProbeOutcome::Unauthenticated) => None,
            (SessionPhase::Authenticated, ProbeOutcome::Unauthenticated) => {
                self.phase = SessionPhase::Invalid;
                if self.notice_shown {
                    None
                } else {
                    self.notice_shown = true;
                    Some(SessionEffect::Invalidated)
                }
            }
        }
    }
}
