//! Response DTOs

use std::collections::HashMap;

use serde::Deserialize;

/// Successful answer of the liveness check (`GET /api/auth/me`).
#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    /// Whether the account completed email verification.
    pub is_active: bool,
}

impl MeResponse {
    /// Display identifier for the top bar, username preferred.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.email)
    }
}

/// Successful answer of `POST /api/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Error body shape used by the backend for 400 responses:
/// `{"detail": {"errors": {"email": "..."}}}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<ErrorDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub errors: HashMap<String, String>,
}
