//! Verification Resend Flow
//!
//! The verify-email-pending page flow: resend gating through the
//! persisted cooldown, short-retention storage of the address awaiting
//! verification, and cleanup once the account is verified.

use std::sync::Arc;

use chrono::Utc;

use crate::application::services::{CooldownKeys, CooldownTimer};
use crate::config::CooldownSettings;
use crate::domain::CooldownReason;
use crate::infrastructure::api::AuthApi;
use crate::infrastructure::storage::{keys, TabStorage, VERIFY_KEYS};
use crate::shared::error::ApiError;
use crate::shared::validation::{is_valid_email_format, mask_email_fixed};

/// How long a user-entered email is retained for reload recovery.
const EMAIL_RETENTION_MINUTES: i64 = 30;

/// Which page routed the user into the verification flow. Affects the
/// back-link and copy only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyFlow {
    /// Fresh registration.
    Signup,
    /// Logged-in-but-unverified user coming from the home page.
    Home,
}

impl VerifyFlow {
    fn as_storage_str(&self) -> &'static str {
        match self {
            VerifyFlow::Signup => "signup",
            VerifyFlow::Home => "home",
        }
    }

    fn from_storage_str(raw: &str) -> Option<Self> {
        match raw {
            "signup" => Some(VerifyFlow::Signup),
            "home" => Some(VerifyFlow::Home),
            _ => None,
        }
    }
}

/// Result of one resend attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResendOutcome {
    /// A cooldown is (now) running; the submit control stays disabled.
    CoolingDown {
        remaining_seconds: u64,
        rate_limited: bool,
    },
    /// The backend accepted the resend; a fresh cooldown covers the
    /// server-advertised resend interval.
    Accepted { cooldown_seconds: u64 },
    /// The supplied address failed the format check; nothing was sent.
    InvalidEmail,
    /// No session and no usable address; the page must ask for one.
    NeedsEmail,
    /// Any other failure: generic message, no cooldown.
    Failed,
}

/// Verification-resend flow for one page context.
pub struct VerificationFlow {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn TabStorage>,
    cooldown: CooldownTimer,
}

impl VerificationFlow {
    pub fn new(
        api: Arc<dyn AuthApi>,
        storage: Arc<dyn TabStorage>,
        settings: &CooldownSettings,
    ) -> Self {
        let cooldown = CooldownTimer::new(
            Arc::clone(&storage),
            CooldownKeys::verification(),
            settings.clone(),
        );
        Self {
            api,
            storage,
            cooldown,
        }
    }

    /// The flow's cooldown timer, for UI tick subscriptions.
    pub fn cooldown(&self) -> &CooldownTimer {
        &self.cooldown
    }

    /// Resume a persisted cooldown on page load.
    pub fn restore(&self) -> bool {
        self.cooldown.restore()
    }

    /// Address awaiting verification, if still within its retention
    /// window. An expired or unreadable retention deadline purges it.
    pub fn stored_email(&self) -> Option<String> {
        let email = self.storage.get(keys::VERIFY_EMAIL)?;
        if email.is_empty() {
            return None;
        }
        match self.storage.get(keys::VERIFY_EMAIL_EXPIRES_AT) {
            None => Some(email),
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(expires_at) if Utc::now().timestamp_millis() <= expires_at => Some(email),
                _ => {
                    self.storage.remove(keys::VERIFY_EMAIL);
                    self.storage.remove(keys::VERIFY_EMAIL_EXPIRES_AT);
                    None
                }
            },
        }
    }

    /// Stored address masked for display.
    pub fn masked_stored_email(&self) -> Option<String> {
        mask_email_fixed(&self.stored_email()?)
    }

    /// Keep a user-entered address for reload recovery, with a short
    /// retention deadline to limit how long it lingers.
    pub fn remember_email(&self, email: &str) {
        let expires_at = Utc::now().timestamp_millis() + EMAIL_RETENTION_MINUTES * 60 * 1000;
        self.storage.set(keys::VERIFY_EMAIL, email);
        self.storage
            .set(keys::VERIFY_EMAIL_EXPIRES_AT, &expires_at.to_string());
    }

    pub fn set_flow(&self, flow: VerifyFlow) {
        self.storage.set(keys::VERIFY_FLOW, flow.as_storage_str());
    }

    pub fn flow(&self) -> Option<VerifyFlow> {
        VerifyFlow::from_storage_str(&self.storage.get(keys::VERIFY_FLOW)?)
    }

    /// Ask for a fresh verification email.
    ///
    /// `explicit_email` is the fallback-input path for visitors whose
    /// stored address was lost; logged-in users resend with no address and
    /// let the session decide. Both a 200 and a 429 start a cooldown (the
    /// backend advertises the resend interval on success too); only the
    /// 429 paints the rate-limit hint.
    pub async fn resend(&self, explicit_email: Option<&str>) -> ResendOutcome {
        if let Some(remaining) = self.cooldown.gate() {
            return ResendOutcome::CoolingDown {
                remaining_seconds: remaining,
                rate_limited: self.cooldown.snapshot().reason == CooldownReason::RateLimited,
            };
        }

        let email = match explicit_email {
            Some(raw) => {
                let trimmed = raw.trim();
                if !is_valid_email_format(trimmed) {
                    return ResendOutcome::InvalidEmail;
                }
                self.remember_email(trimmed);
                Some(trimmed.to_string())
            }
            None => self.stored_email(),
        };

        match self.api.resend_verification(email.as_deref()).await {
            Ok(advertised) => {
                let secs = self.cooldown.apply_duration(advertised, CooldownReason::None);
                tracing::info!(cooldown_seconds = secs, "verification email resent");
                ResendOutcome::Accepted {
                    cooldown_seconds: secs,
                }
            }
            Err(ApiError::Throttled { retry_after }) => {
                let secs = self
                    .cooldown
                    .apply_duration(retry_after, CooldownReason::RateLimited);
                ResendOutcome::CoolingDown {
                    remaining_seconds: secs,
                    rate_limited: true,
                }
            }
            Err(ApiError::Unauthenticated) => ResendOutcome::NeedsEmail,
            Err(ApiError::Rejected { .. }) => ResendOutcome::InvalidEmail,
            Err(e) => {
                tracing::warn!(error = %e, "verification resend failed");
                ResendOutcome::Failed
            }
        }
    }

    /// Re-check verification before resending, so a user who just clicked
    /// the email link is not offered another resend. Errors are absorbed.
    pub async fn check_verified(&self) -> Option<bool> {
        match self.api.fetch_me().await {
            Ok(me) => {
                if me.is_active {
                    self.mark_verified();
                }
                Some(me.is_active)
            }
            Err(e) => {
                tracing::debug!(error = %e, "verification status check absorbed failure");
                None
            }
        }
    }

    /// Verification completed: the cooldown is moot and stored flow state
    /// must not outlive it.
    pub fn mark_verified(&self) {
        self.cooldown.cancel();
        for key in VERIFY_KEYS {
            self.storage.remove(key);
        }
    }
}
