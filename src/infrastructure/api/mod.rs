//! Backend API Boundary
//!
//! The [`AuthApi`] trait is the seam between the page services and the
//! backend; [`HttpAuthApi`] is the reqwest implementation used in
//! production. Tests inject fakes instead.

mod client;

use async_trait::async_trait;

use crate::application::dto::{ChatReply, ChatRequest, MeResponse};
use crate::shared::error::ApiError;

pub use client::HttpAuthApi;

/// Backend API surface consumed by the page services.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Liveness check ("who am I"). `Err(Unauthenticated)` is the explicit
    /// no-session answer; transport failures are never authoritative.
    async fn fetch_me(&self) -> Result<MeResponse, ApiError>;

    /// Ask for a fresh verification email. On success the backend also
    /// advertises the resend interval, returned here in seconds.
    async fn resend_verification<'a>(&self, email: Option<&'a str>)
        -> Result<Option<u64>, ApiError>;

    /// Ask for a password-reset email.
    async fn request_password_reset(&self, email: &str) -> Result<(), ApiError>;

    /// Send one chat message with recent history.
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError>;

    /// Terminate the session server-side.
    async fn logout(&self) -> Result<(), ApiError>;
}
