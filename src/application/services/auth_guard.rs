//! Home Auth Guard
//!
//! Page-load orchestration for the home/chat page: one initial liveness
//! check decides the chat access tier, starts the heartbeat for logged-in
//! users, and routes chat submissions with their 401/403 handling.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::application::dto::ChatRequest;
use crate::application::services::{PageHooks, SessionHeartbeat};
use crate::config::ChatSettings;
use crate::domain::{ChatAccess, ChatHistory, SessionPhase};
use crate::infrastructure::api::AuthApi;
use crate::infrastructure::storage::{TabStorage, VERIFY_KEYS};
use crate::shared::error::ApiError;

/// Result of one chat submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatSendOutcome {
    /// The backend answered; the reply text is ready to render.
    Delivered(String),
    /// Empty message after trimming; nothing was sent.
    Ignored,
    /// Chat is not enabled for the current access tier.
    Blocked(ChatAccess),
    /// The session was invalidated mid-conversation (explicit 401).
    SessionInvalid,
    /// The account lost (or never had) verification (explicit 403).
    Unverified,
    /// Any other failure; rendered as a generic error, never as a logout.
    Failed,
}

/// Auth guard and chat gateway for the home page.
pub struct HomeGuard {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn TabStorage>,
    hooks: Arc<dyn PageHooks>,
    heartbeat: SessionHeartbeat,
    access: Mutex<ChatAccess>,
    history: Mutex<ChatHistory>,
}

impl HomeGuard {
    pub fn new(
        api: Arc<dyn AuthApi>,
        storage: Arc<dyn TabStorage>,
        hooks: Arc<dyn PageHooks>,
        heartbeat: SessionHeartbeat,
        chat: &ChatSettings,
    ) -> Self {
        Self {
            api,
            storage,
            hooks,
            heartbeat,
            access: Mutex::new(ChatAccess::Guest),
            history: Mutex::new(ChatHistory::new(chat.history_limit)),
        }
    }

    pub fn access(&self) -> ChatAccess {
        *self.access.lock()
    }

    pub fn heartbeat(&self) -> &SessionHeartbeat {
        &self.heartbeat
    }

    fn set_access(&self, access: ChatAccess) {
        *self.access.lock() = access;
        self.hooks.chat_access_changed(access);
    }

    /// Page-load probe. Any failure, authoritative or not, leaves the page
    /// in the guest baseline; only a confirmed session arms the heartbeat.
    pub async fn initialize(&self) {
        match self.api.fetch_me().await {
            Ok(me) => {
                self.heartbeat.note_authenticated();
                self.heartbeat.start();
                self.hooks.account_loaded(&me);
                if me.is_active {
                    // Verified: residual verification-flow state is stale.
                    for key in VERIFY_KEYS {
                        self.storage.remove(key);
                    }
                    self.set_access(ChatAccess::Active);
                } else {
                    self.set_access(ChatAccess::Unverified);
                }
                tracing::info!(
                    user = me.display_name(),
                    verified = me.is_active,
                    "session established"
                );
            }
            Err(e) => {
                tracing::debug!(error = %e, "no session at page load");
                self.heartbeat.stop();
                self.set_access(ChatAccess::Guest);
            }
        }
    }

    /// Submit one chat message with the recent history attached.
    pub async fn send_message(&self, text: &str) -> ChatSendOutcome {
        if self.heartbeat.phase() == SessionPhase::Invalid {
            return ChatSendOutcome::SessionInvalid;
        }
        let access = self.access();
        if !access.can_send() {
            return ChatSendOutcome::Blocked(access);
        }
        let message = text.trim();
        if message.is_empty() {
            return ChatSendOutcome::Ignored;
        }

        let request = ChatRequest {
            message: message.to_string(),
            history: self.history.lock().recent(),
        };

        match self.api.send_chat(&request).await {
            Ok(reply) => {
                self.history.lock().push_exchange(message, &reply.reply);
                ChatSendOutcome::Delivered(reply.reply)
            }
            Err(ApiError::Unauthenticated) => {
                // The heartbeat owns the one-shot notice; mirror the tier
                // locally without re-firing the hook.
                *self.access.lock() = ChatAccess::Guest;
                self.heartbeat.observe_unauthenticated();
                ChatSendOutcome::SessionInvalid
            }
            Err(ApiError::Forbidden) => {
                self.set_access(ChatAccess::Unverified);
                ChatSendOutcome::Unverified
            }
            Err(e) => {
                tracing::warn!(error = %e, "chat send failed");
                ChatSendOutcome::Failed
            }
        }
    }

    /// Log out: best-effort server call, then reset to the guest baseline.
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            tracing::debug!(error = %e, "logout call failed, clearing local state anyway");
        }
        for key in VERIFY_KEYS {
            self.storage.remove(key);
        }
        self.heartbeat.stop();
        self.set_access(ChatAccess::Guest);
    }
}
