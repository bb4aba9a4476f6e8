//! # Chat Client
//!
//! Headless driver for the session/cooldown core. Initializes tracing,
//! loads configuration, assembles the page runtime, establishes the
//! session, and keeps the heartbeat alive until interrupted. Page
//! callbacks are rendered as log lines.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use chat_client::application::dto::MeResponse;
use chat_client::application::services::{PageHooks, VisibilityFlag};
use chat_client::config::Settings;
use chat_client::domain::ChatAccess;
use chat_client::startup::PageRuntime;

/// Hooks implementation that logs instead of touching a DOM.
struct LoggingHooks;

impl PageHooks for LoggingHooks {
    fn account_loaded(&self, me: &MeResponse) {
        info!(user = me.display_name(), verified = me.is_active, "account loaded");
    }

    fn chat_access_changed(&self, access: ChatAccess) {
        info!(?access, "chat access changed");
    }

    fn session_invalidated(&self, notice: &str) {
        info!(notice, "session invalidated");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    chat_client::telemetry::init_tracing();

    info!("Starting chat client...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        base_url = %settings.api.base_url,
        environment = %settings.environment,
        "Configuration loaded"
    );

    let visibility = Arc::new(VisibilityFlag::new(true));
    let runtime = PageRuntime::build(settings, Arc::new(LoggingHooks), visibility)?;

    runtime.restore_cooldowns();
    runtime.guard.initialize().await;

    info!("Session established, heartbeat running (Ctrl-C to stop)");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown();
    info!("Stopped");

    Ok(())
}
