//! Flow Tests
//!
//! End-to-end page-flow scenarios over the assembled runtime, driven on
//! a paused clock with scripted backend responses.

mod cooldown_tests;
mod recovery_tests;
