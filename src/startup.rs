//! Page Runtime Startup
//!
//! Wires the HTTP client, tab-scoped storage, and page-flow services into
//! one runtime the way a page script would on load.

use std::sync::Arc;

use anyhow::Result;

use crate::application::services::{
    HomeGuard, PageHooks, PageVisibility, PasswordResetFlow, SessionHeartbeat, VerificationFlow,
};
use crate::config::Settings;
use crate::infrastructure::api::{AuthApi, HttpAuthApi};
use crate::infrastructure::storage::{MemoryStorage, TabStorage};

/// One assembled page runtime: every flow sharing the same backend
/// client, storage, and heartbeat.
pub struct PageRuntime {
    pub settings: Arc<Settings>,
    pub api: Arc<dyn AuthApi>,
    pub storage: Arc<dyn TabStorage>,
    pub heartbeat: SessionHeartbeat,
    pub guard: HomeGuard,
    pub verification: VerificationFlow,
    pub password_reset: PasswordResetFlow,
}

impl PageRuntime {
    /// Build the runtime from settings with the real HTTP client and an
    /// in-memory tab store.
    pub fn build(
        settings: Settings,
        hooks: Arc<dyn PageHooks>,
        visibility: Arc<dyn PageVisibility>,
    ) -> Result<Self> {
        let api: Arc<dyn AuthApi> = Arc::new(HttpAuthApi::new(&settings.api)?);
        let storage: Arc<dyn TabStorage> = Arc::new(MemoryStorage::new());
        tracing::info!(base_url = %settings.api.base_url, "backend client created");

        Ok(Self::assemble(settings, api, storage, hooks, visibility))
    }

    /// Wire the runtime from already-built parts. Tests inject fakes here.
    pub fn assemble(
        settings: Settings,
        api: Arc<dyn AuthApi>,
        storage: Arc<dyn TabStorage>,
        hooks: Arc<dyn PageHooks>,
        visibility: Arc<dyn PageVisibility>,
    ) -> Self {
        let heartbeat = SessionHeartbeat::new(
            Arc::clone(&api),
            Arc::clone(&hooks),
            visibility,
            settings.heartbeat.clone(),
        );
        let guard = HomeGuard::new(
            Arc::clone(&api),
            Arc::clone(&storage),
            hooks,
            heartbeat.clone(),
            &settings.chat,
        );
        let verification = VerificationFlow::new(
            Arc::clone(&api),
            Arc::clone(&storage),
            &settings.cooldown,
        );
        let password_reset = PasswordResetFlow::new(
            Arc::clone(&api),
            Arc::clone(&storage),
            &settings.cooldown,
        );

        Self {
            settings: Arc::new(settings),
            api,
            storage,
            heartbeat,
            guard,
            verification,
            password_reset,
        }
    }

    /// Resume persisted cooldowns, as each page does on load.
    pub fn restore_cooldowns(&self) {
        let verify = self.verification.restore();
        let forgot = self.password_reset.restore();
        tracing::debug!(verify, forgot, "persisted cooldowns restored");
    }

    /// Stop background work. Persisted cooldown state is left in place so
    /// a later runtime can resume it.
    pub fn shutdown(&self) {
        self.heartbeat.stop();
    }
}
