//! Recovery Flow Tests
//!
//! Verification-resend and password-reset flows over the assembled
//! runtime, including cross-flow cooldown isolation.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use chat_client::application::services::{
    PageVisibility, ResendOutcome, ResetRequestOutcome, VisibilityFlag,
};
use chat_client::infrastructure::storage::{keys, MemoryStorage, TabStorage};
use chat_client::shared::error::ApiError;
use chat_client::startup::PageRuntime;

use crate::common::{test_settings, RecordingHooks, ScriptedApi};

fn runtime_with(api: &Arc<ScriptedApi>) -> (PageRuntime, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let runtime = PageRuntime::assemble(
        test_settings(),
        Arc::clone(api) as Arc<dyn chat_client::infrastructure::api::AuthApi>,
        Arc::clone(&storage) as Arc<dyn TabStorage>,
        RecordingHooks::new() as Arc<dyn chat_client::application::services::PageHooks>,
        Arc::new(VisibilityFlag::new(true)) as Arc<dyn PageVisibility>,
    );
    (runtime, storage)
}

#[tokio::test(start_paused = true)]
async fn resend_cooldown_does_not_gate_the_reset_flow() {
    let api = ScriptedApi::new();
    api.push_resend(Ok(Some(60)));
    api.push_reset(Ok(()));
    let (runtime, storage) = runtime_with(&api);

    assert_eq!(
        runtime.verification.resend(None).await,
        ResendOutcome::Accepted {
            cooldown_seconds: 60
        }
    );
    assert!(storage.get(keys::VERIFY_COOLDOWN_UNTIL).is_some());

    // The flows persist under distinct keys; one cooldown never leaks
    // into the other.
    assert_eq!(
        runtime.password_reset.request("user@example.com").await,
        ResetRequestOutcome::Accepted
    );
    assert_eq!(storage.get(keys::FORGOT_COOLDOWN_UNTIL), None);
}

#[tokio::test(start_paused = true)]
async fn throttled_resend_survives_a_runtime_reload() {
    let api = ScriptedApi::new();
    api.push_resend(Err(ApiError::Throttled {
        retry_after: Some(120),
    }));
    let (runtime, storage) = runtime_with(&api);

    assert_eq!(
        runtime.verification.resend(None).await,
        ResendOutcome::CoolingDown {
            remaining_seconds: 120,
            rate_limited: true
        }
    );
    drop(runtime);

    // A reloaded page assembles a fresh runtime over the same store.
    let reloaded_api = ScriptedApi::new();
    let reloaded = PageRuntime::assemble(
        test_settings(),
        Arc::clone(&reloaded_api) as Arc<dyn chat_client::infrastructure::api::AuthApi>,
        Arc::clone(&storage) as Arc<dyn TabStorage>,
        RecordingHooks::new() as Arc<dyn chat_client::application::services::PageHooks>,
        Arc::new(VisibilityFlag::new(true)) as Arc<dyn PageVisibility>,
    );
    reloaded.restore_cooldowns();
    assert!(reloaded.verification.cooldown().is_active());

    // Still gated, and without any network traffic.
    match reloaded.verification.resend(None).await {
        ResendOutcome::CoolingDown { rate_limited, .. } => assert!(rate_limited),
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn session_expired_resend_asks_for_an_email() {
    let api = ScriptedApi::new();
    api.push_resend(Err(ApiError::Unauthenticated));
    let (runtime, storage) = runtime_with(&api);

    assert_eq!(
        runtime.verification.resend(None).await,
        ResendOutcome::NeedsEmail
    );
    assert_eq!(storage.get(keys::VERIFY_COOLDOWN_UNTIL), None);

    // The fallback input path validates before sending.
    api.push_resend(Ok(None));
    assert_eq!(
        runtime.verification.resend(Some("user@example.com")).await,
        ResendOutcome::Accepted {
            cooldown_seconds: 60
        }
    );
    assert_eq!(
        runtime.verification.stored_email().as_deref(),
        Some("user@example.com")
    );
}
