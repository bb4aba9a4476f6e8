//! Cooldown State
//!
//! Pure countdown math shared by the password-reset and verification-resend
//! cooldowns. Deadlines are absolute epoch milliseconds so a page reload can
//! recompute remaining time without knowing when the cooldown started.

use serde::{Deserialize, Serialize};

/// Why a cooldown was imposed. Presentational only; must never affect
/// the timing logic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CooldownReason {
    /// No cooldown, or one started without a specific cause.
    #[default]
    None,
    /// The server answered with an explicit rate-limit signal.
    RateLimited,
    /// A generic failure message applies instead of the rate hint.
    Generic,
}

impl CooldownReason {
    /// Storage representation, kept compatible with the persisted values
    /// written by earlier page revisions.
    pub fn as_storage_str(&self) -> &'static str {
        match self {
            CooldownReason::None => "",
            CooldownReason::RateLimited => "rate",
            CooldownReason::Generic => "generic",
        }
    }

    /// Parse a persisted value. Unknown strings collapse to `None`.
    pub fn from_storage_str(raw: &str) -> Self {
        match raw {
            "rate" => CooldownReason::RateLimited,
            "generic" => CooldownReason::Generic,
            _ => CooldownReason::None,
        }
    }
}

/// Latest observable cooldown state, as emitted on every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CooldownSnapshot {
    /// Seconds left, rounded up. Zero means idle.
    pub remaining_seconds: u64,
    pub reason: CooldownReason,
}

impl CooldownSnapshot {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.remaining_seconds > 0
    }
}

/// Seconds left until `resume_at_ms`, rounded up, never negative.
pub fn remaining_seconds(resume_at_ms: i64, now_ms: i64) -> u64 {
    let diff = resume_at_ms.saturating_sub(now_ms);
    if diff <= 0 {
        0
    } else {
        ((diff + 999) / 1000) as u64
    }
}

/// Resolve a server-advertised duration into one the timer will honor.
///
/// Absent or non-positive values fall back to `fallback_secs` so a stripped
/// `Retry-After` header never leaves the UI without a cooldown; oversized
/// values are clamped to `max_secs`.
pub fn sanitize_duration_secs(advertised: Option<u64>, fallback_secs: u64, max_secs: u64) -> u64 {
    match advertised {
        Some(s) if s > 0 => s.min(max_secs),
        _ => fallback_secs,
    }
}
