//! # Chat Client Core
//!
//! The session and cooldown core of a chat page client:
//! - Session heartbeat polling the backend `/api/auth/me` endpoint
//! - Persisted cooldown timers gating resend and reset submissions
//! - Home-page auth guard wiring chat access to session state
//! - Verification-resend and password-reset page flows
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Pure session, cooldown, and chat state machines
//! - **Application Layer**: Timer-driven services, page flows, and DTOs
//! - **Infrastructure Layer**: HTTP client and tab-scoped storage
//!
//! ## Module Structure
//!
//! ```text
//! chat_client/
//! +-- config/         Configuration management
//! +-- domain/         Session, cooldown, and chat state machines
//! +-- application/    Page-flow services and DTOs
//! +-- infrastructure/ HTTP client and tab storage
//! +-- shared/         Common utilities (errors, validation)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core state machines
pub mod domain;

// Application layer - Page-flow services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Shared utilities
pub mod shared;

// Runtime assembly
pub mod startup;

// Telemetry and observability
pub mod telemetry;
