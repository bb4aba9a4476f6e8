//! Tab-Scoped Storage
//!
//! Injectable storage capability standing in for the browser tab's
//! session storage. Every operation is silently fallible: when the
//! backing store is unavailable the timers keep working for the current
//! page life, they simply do not survive a reload.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Storage keys shared across page flows. Deadline/reason pairs are
/// distinct per flow so unrelated flows cannot cross-contaminate each
/// other's cooldowns.
pub mod keys {
    /// Password-reset-request cooldown deadline (epoch ms as string).
    pub const FORGOT_COOLDOWN_UNTIL: &str = "pcbuild_forgot_cooldown_until";
    /// Password-reset-request cooldown reason.
    pub const FORGOT_COOLDOWN_REASON: &str = "pcbuild_forgot_cooldown_reason";
    /// Email remembered for the reset-confirmation page.
    pub const FORGOT_EMAIL: &str = "pcbuild_forgot_email";

    /// Verification-resend cooldown deadline (epoch ms as string).
    pub const VERIFY_COOLDOWN_UNTIL: &str = "pcbuild_verify_cooldown_until";
    /// Verification-resend cooldown reason.
    pub const VERIFY_COOLDOWN_REASON: &str = "pcbuild_verify_cooldown_reason";
    /// Email awaiting verification, shown masked on the pending page.
    pub const VERIFY_EMAIL: &str = "pcbuild_verify_email";
    /// Retention deadline for [`VERIFY_EMAIL`] (epoch ms as string).
    pub const VERIFY_EMAIL_EXPIRES_AT: &str = "pcbuild_verify_email_expires_at";
    /// Which flow routed the user to the pending page ("signup" | "home").
    pub const VERIFY_FLOW: &str = "pcbuild_verify_flow";
}

/// Keys cleared once an account is verified or logged out, so stale
/// verification state cannot leak into the next session.
pub const VERIFY_KEYS: &[&str] = &[
    keys::VERIFY_EMAIL,
    keys::VERIFY_EMAIL_EXPIRES_AT,
    keys::VERIFY_FLOW,
    keys::VERIFY_COOLDOWN_UNTIL,
    keys::VERIFY_COOLDOWN_REASON,
];

/// Tab-scoped key/value storage.
///
/// `set`/`remove` report success so callers can log degraded operation,
/// but no caller may treat failure as an error.
pub trait TabStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> bool;
    fn remove(&self, key: &str) -> bool;
}

/// Read a stored epoch-millisecond timestamp. Unparseable values read as
/// absent.
pub fn read_epoch_ms(storage: &dyn TabStorage, key: &str) -> Option<i64> {
    storage.get(key)?.trim().parse::<i64>().ok()
}

/// In-memory implementation, also the test double of choice.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TabStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.entries.write().insert(key.to_string(), value.to_string());
        true
    }

    fn remove(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }
}
