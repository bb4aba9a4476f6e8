//! Domain Layer
//!
//! Pure state machines and value types driving the page-level services.
//! Nothing in this layer touches timers, storage, or the network.

pub mod chat;
pub mod cooldown;
pub mod session;

pub use chat::{ChatAccess, ChatHistory, ChatRole, ChatTurn};
pub use cooldown::{remaining_seconds, sanitize_duration_secs, CooldownReason, CooldownSnapshot};
pub use session::{ProbeOutcome, SessionEffect, SessionFlags, SessionPhase};
