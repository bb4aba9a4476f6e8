//! Common Test Utilities
//!
//! Scripted backend, recording hooks, and a failure-injecting storage
//! shared by the flow tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use chat_client::application::dto::{ChatReply, ChatRequest, MeResponse};
use chat_client::application::services::PageHooks;
use chat_client::config::{
    ApiSettings, ChatSettings, CooldownSettings, HeartbeatSettings, Settings,
};
use chat_client::domain::ChatAccess;
use chat_client::infrastructure::api::AuthApi;
use chat_client::infrastructure::storage::{MemoryStorage, TabStorage};
use chat_client::shared::error::ApiError;

/// Settings sized for paused-clock tests: zero startup jitter so probe
/// timing is deterministic.
pub fn test_settings() -> Settings {
    Settings {
        api: ApiSettings {
            base_url: "http://localhost:8000".into(),
            timeout_seconds: 15,
        },
        heartbeat: HeartbeatSettings {
            base_interval_secs: 60,
            startup_jitter_secs: 0,
        },
        cooldown: CooldownSettings {
            fallback_seconds: 60,
            max_seconds: 600,
            tick_interval_ms: 250,
        },
        chat: ChatSettings { history_limit: 8 },
        environment: "test".into(),
    }
}

pub fn me(email: &str, verified: bool) -> MeResponse {
    MeResponse {
        email: email.into(),
        username: None,
        is_active: verified,
    }
}

/// Backend fake answering from pre-loaded scripts, one response per call.
/// An exhausted script answers with a transport error, which no flow
/// treats as authoritative.
#[derive(Default)]
pub struct ScriptedApi {
    me_script: Mutex<VecDeque<Result<MeResponse, ApiError>>>,
    resend_script: Mutex<VecDeque<Result<Option<u64>, ApiError>>>,
    reset_script: Mutex<VecDeque<Result<(), ApiError>>>,
    chat_script: Mutex<VecDeque<Result<ChatReply, ApiError>>>,
    pub fetch_me_calls: AtomicUsize,
    pub chat_requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_me(&self, response: Result<MeResponse, ApiError>) {
        self.me_script.lock().push_back(response);
    }

    pub fn push_resend(&self, response: Result<Option<u64>, ApiError>) {
        self.resend_script.lock().push_back(response);
    }

    pub fn push_reset(&self, response: Result<(), ApiError>) {
        self.reset_script.lock().push_back(response);
    }

    pub fn push_chat(&self, response: Result<ChatReply, ApiError>) {
        self.chat_script.lock().push_back(response);
    }

    pub fn fetch_me_count(&self) -> usize {
        self.fetch_me_calls.load(Ordering::SeqCst)
    }

    fn exhausted<T>() -> Result<T, ApiError> {
        Err(ApiError::Transport("script exhausted".into()))
    }
}

#[async_trait]
impl AuthApi for ScriptedApi {
    async fn fetch_me(&self) -> Result<MeResponse, ApiError> {
        self.fetch_me_calls.fetch_add(1, Ordering::SeqCst);
        self.me_script
            .lock()
            .pop_front()
            .unwrap_or_else(Self::exhausted)
    }

    async fn resend_verification<'a>(&self, _email: Option<&'a str>) -> Result<Option<u64>, ApiError> {
        self.resend_script
            .lock()
            .pop_front()
            .unwrap_or_else(Self::exhausted)
    }

    async fn request_password_reset(&self, _email: &str) -> Result<(), ApiError> {
        self.reset_script
            .lock()
            .pop_front()
            .unwrap_or_else(Self::exhausted)
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        self.chat_requests.lock().push(request.clone());
        self.chat_script
            .lock()
            .pop_front()
            .unwrap_or_else(Self::exhausted)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

/// One recorded page callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    AccountLoaded { email: String, verified: bool },
    AccessChanged(ChatAccess),
    SessionInvalidated(String),
}

/// Hooks fake recording every callback in order.
#[derive(Default)]
pub struct RecordingHooks {
    events: Mutex<Vec<HookEvent>>,
}

impl RecordingHooks {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<HookEvent> {
        self.events.lock().clone()
    }

    pub fn invalidation_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, HookEvent::SessionInvalidated(_)))
            .count()
    }
}

impl PageHooks for RecordingHooks {
    fn account_loaded(&self, me: &MeResponse) {
        self.events.lock().push(HookEvent::AccountLoaded {
            email: me.email.clone(),
            verified: me.is_active,
        });
    }

    fn chat_access_changed(&self, access: ChatAccess) {
        self.events.lock().push(HookEvent::AccessChanged(access));
    }

    fn session_invalidated(&self, notice: &str) {
        self.events
            .lock()
            .push(HookEvent::SessionInvalidated(notice.to_string()));
    }
}

/// Storage wrapper whose writes can be made to fail, modelling a tab
/// store that rejects mutations.
#[derive(Default)]
pub struct FlakyStorage {
    inner: MemoryStorage,
    fail_writes: AtomicBool,
}

impl FlakyStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl TabStorage for FlakyStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> bool {
        if self.fail_writes.load(Ordering::SeqCst) {
            return false;
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> bool {
        if self.fail_writes.load(Ordering::SeqCst) {
            return false;
        }
        self.inner.remove(key)
    }
}
