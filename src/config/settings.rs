//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Backend API configuration
    pub api: ApiSettings,

    /// Session heartbeat configuration
    pub heartbeat: HeartbeatSettings,

    /// Cooldown timer configuration
    pub cooldown: CooldownSettings,

    /// Chat widget configuration
    pub chat: ChatSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Backend API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the backend (e.g., "http://localhost:8000")
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

/// Session heartbeat configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HeartbeatSettings {
    /// Interval between liveness probes in seconds (default: 60)
    pub base_interval_secs: u64,

    /// Maximum uniform jitter added to the first probe in seconds
    /// (default: 5). Spreads probes across tabs opened at the same time.
    pub startup_jitter_secs: u64,
}

/// Cooldown timer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CooldownSettings {
    /// Cooldown applied when the server omits Retry-After (default: 60)
    pub fallback_seconds: u64,

    /// Upper bound honored for server-advertised durations (default: 600)
    pub max_seconds: u64,

    /// Countdown refresh cadence in milliseconds (default: 250)
    pub tick_interval_ms: u64,
}

/// Chat widget configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatSettings {
    /// Number of recent turns forwarded with each chat request
    pub history_limit: usize,
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if a timing knob is set to a value the timers cannot run with.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("api.base_url", "http://localhost:8000")?
            .set_default("api.timeout_seconds", 15)?
            .set_default("heartbeat.base_interval_secs", 60)?
            .set_default("heartbeat.startup_jitter_secs", 5)?
            .set_default("cooldown.fallback_seconds", 60)?
            .set_default("cooldown.max_seconds", 600)?
            .set_default("cooldown.tick_interval_ms", 250)?
            .set_default("chat.history_limit", 8)?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Load from environment variables
            // APP__API__BASE_URL=... -> api.base_url = ...
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            // Map simple environment variables
            .set_override_option("api.base_url", std::env::var("API_BASE_URL").ok())?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| {
                settings.validate()?;
                Ok(settings)
            })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Message("api.base_url must not be empty".into()));
        }
        if self.cooldown.tick_interval_ms == 0 {
            return Err(ConfigError::Message(
                "cooldown.tick_interval_ms must be positive".into(),
            ));
        }
        if self.heartbeat.base_interval_secs == 0 {
            return Err(ConfigError::Message(
                "heartbeat.base_interval_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}
