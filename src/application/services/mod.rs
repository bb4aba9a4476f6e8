//! Application Services
//!
//! Timer-driven services and page flows built on the domain state
//! machines. Rendering is excluded: services emit events and call the
//! hooks supplied by the embedding page.

pub mod auth_guard;
pub mod cooldown_timer;
pub mod heartbeat;
pub mod password_reset;
pub mod verification;

use crate::application::dto::MeResponse;
use crate::domain::ChatAccess;

pub use auth_guard::{ChatSendOutcome, HomeGuard};
pub use cooldown_timer::{CooldownEvent, CooldownKeys, CooldownTimer};
pub use heartbeat::{
    AlwaysVisible, PageVisibility, SessionHeartbeat, VisibilityFlag, SESSION_EXPIRED_NOTICE,
};
pub use password_reset::{PasswordResetFlow, ResetRequestOutcome};
pub use verification::{ResendOutcome, VerificationFlow, VerifyFlow};

/// Callback hooks supplied by the page. The DOM layer implements these to
/// render auth controls, enable/disable the chat widget, and show the
/// one-shot session-expired notice.
#[cfg_attr(test, mockall::automock)]
pub trait PageHooks: Send + Sync {
    /// A liveness check returned account attributes (top-bar greeting,
    /// verification link).
    fn account_loaded(&self, me: &MeResponse);

    /// Chat enablement changed.
    fn chat_access_changed(&self, access: ChatAccess);

    /// The session was invalidated. Fired at most once per page life.
    fn session_invalidated(&self, notice: &str);
}
