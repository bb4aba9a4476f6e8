//! Password Reset Request Flow
//!
//! The forgot-password page flow: client-side validation, one request to
//! the backend, and a persisted cooldown gating repeat submissions. The
//! backend answers the same way whether or not the account exists, so
//! this layer never learns that either.

use std::sync::Arc;

use validator::Validate;

use crate::application::dto::ForgotPasswordRequest;
use crate::application::services::{CooldownKeys, CooldownTimer};
use crate::config::CooldownSettings;
use crate::domain::CooldownReason;
use crate::infrastructure::api::AuthApi;
use crate::infrastructure::storage::{keys, TabStorage};
use crate::shared::error::{ApiError, FieldError};
use crate::shared::validation::{field_errors, mask_email_fixed};

/// Result of one reset request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetRequestOutcome {
    /// A cooldown is (now) running; the submit control stays disabled.
    CoolingDown { remaining_seconds: u64 },
    /// The request went through; the page shows its neutral "check your
    /// inbox" confirmation.
    Accepted,
    /// The address failed validation, locally or on the backend.
    Rejected { fields: Vec<FieldError> },
    /// Any other failure: generic message, no cooldown.
    Failed,
}

/// Password-reset request flow for one page context.
pub struct PasswordResetFlow {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn TabStorage>,
    cooldown: CooldownTimer,
}

impl PasswordResetFlow {
    pub fn new(
        api: Arc<dyn AuthApi>,
        storage: Arc<dyn TabStorage>,
        settings: &CooldownSettings,
    ) -> Self {
        let cooldown = CooldownTimer::new(
            Arc::clone(&storage),
            CooldownKeys::password_reset(),
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

    /// Last address a reset was requested for, masked for display on the
    /// confirmation screen.
    pub fn masked_remembered_email(&self) -> Option<String> {
        mask_email_fixed(&self.storage.get(keys::FORGOT_EMAIL)?)
    }

    /// Submit one reset request.
    ///
    /// The cooldown gate runs before validation: while a countdown is
    /// live, even a malformed address gets the "wait" answer rather than
    /// a validation error.
    pub async fn request(&self, email: &str) -> ResetRequestOutcome {
        if let Some(remaining) = self.cooldown.gate() {
            return ResetRequestOutcome::CoolingDown {
                remaining_seconds: remaining,
            };
        }

        let body = ForgotPasswordRequest {
            email: email.trim().to_string(),
        };
        if let Err(errors) = body.validate() {
            return ResetRequestOutcome::Rejected {
                fields: field_errors(&errors),
            };
        }

        match self.api.request_password_reset(&body.email).await {
            Ok(()) => {
                self.storage.set(keys::FORGOT_EMAIL, &body.email);
                tracing::info!("password reset requested");
                ResetRequestOutcome::Accepted
            }
            Err(ApiError::Throttled { retry_after }) => {
                let secs = self
                    .cooldown
                    .apply_duration(retry_after, CooldownReason::RateLimited);
                ResetRequestOutcome::CoolingDown {
                    remaining_seconds: secs,
                }
            }
            Err(ApiError::Rejected { fields }) => ResetRequestOutcome::Rejected { fields },
            Err(e) => {
                tracing::warn!(error = %e, "password reset request failed");
                ResetRequestOutcome::Failed
            }
        }
    }
}
