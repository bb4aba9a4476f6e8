//! HTTP API Client
//!
//! reqwest-backed implementation of [`AuthApi`]. The session rides on
//! cookies, so the client keeps a cookie store; non-2xx statuses are
//! classified into the [`ApiError`] taxonomy in one place.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Response};

use crate::application::dto::{
    ChatReply, ChatRequest, ErrorBody, ForgotPasswordRequest, MeResponse,
    ResendVerificationRequest,
};
use crate::config::ApiSettings;
use crate::shared::error::{ApiError, FieldError};

use super::AuthApi;

/// Client against the backend auth/chat API.
#[derive(Clone)]
pub struct HttpAuthApi {
    http: Client,
    base_url: String,
}

impl HttpAuthApi {
    /// Build a client from settings. Fails only if the underlying HTTP
    /// client cannot be constructed.
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn transport(e: reqwest::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}

/// Parse a positive integer `Retry-After` value in seconds. Anything else
/// (absent header, date form, zero, garbage) reads as absent and the
/// caller falls back to its configured default.
fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|n| *n > 0)
}

/// Classify a non-success status. Consumes the response because the 400
/// arm reads the body for field errors.
async fn check_status(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    match status.as_u16() {
        401 => Err(ApiError::Unauthenticated),
        403 => Err(ApiError::Forbidden),
        429 => Err(ApiError::Throttled {
            retry_after: parse_retry_after(resp.headers()),
        }),
        400 => {
            let body: ErrorBody = resp.json().await.unwrap_or_default();
            let fields: Vec<FieldError> = body
                .detail
                .map(|d| {
                    d.errors
                        .into_iter()
                        .map(|(field, message)| FieldError { field, message })
                        .collect()
                })
                .unwrap_or_default();
            Err(ApiError::Rejected { fields })
        }
        s => Err(ApiError::Status(s)),
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn fetch_me(&self) -> Result<MeResponse, ApiError> {
        let resp = self
            .http
            .get(self.url("/api/auth/me"))
            .send()
            .await
            .map_err(transport)?;
        let resp = check_status(resp).await?;
        resp.json::<MeResponse>()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))
    }

    async fn resend_verification<'a>(&self, email: Option<&'a str>) -> Result<Option<u64>, ApiError> {
        let body = ResendVerificationRequest {
            email: email.map(str::to_string),
        };
        let resp = self
            .http
            .post(self.url("/api/auth/resend-verification"))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let resp = check_status(resp).await?;
        Ok(parse_retry_after(resp.headers()))
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), ApiError> {
        let body = ForgotPasswordRequest {
            email: email.to_string(),
        };
        let resp = self
            .http
            .post(self.url("/api/auth/forgot-password"))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        check_status(resp).await?;
        Ok(())
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        let resp = self
            .http
            .post(self.url("/api/chat"))
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        let resp = check_status(resp).await?;
        resp.json::<ChatReply>()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url("/api/auth/logout"))
            .send()
            .await
            .map_err(transport)?;
        check_status(resp).await?;
        Ok(())
    }
}
