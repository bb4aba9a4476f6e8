//! Request DTOs

use serde::Serialize;
use validator::Validate;

use crate::domain::ChatTurn;

/// Body of `POST /api/auth/forgot-password`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(
        length(min = 1, max = 50, message = "Email must be at most 50 characters"),
        email(message = "Enter a valid email address")
    )]
    pub email: String,
}

/// Body of `POST /api/auth/resend-verification`.
///
/// `email` is omitted for logged-in users; the backend derives the account
/// from the session cookie instead. Format checking happens in the resend
/// flow before this body is built, so the DTO carries no validation rules.
#[derive(Debug, Clone, Serialize)]
pub struct ResendVerificationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    /// Most recent turns, oldest first.
    pub history: Vec<ChatTurn>,
}
