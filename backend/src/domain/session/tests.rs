//! Regression coverage for the session context.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ProviderCall {
    SetPersistence(PersistenceMode),
    SignIn(String),
    SignOut,
    Reset(String),
}

#[derive(Default)]
struct ScriptedProvider {
    calls: Mutex<Vec<ProviderCall>>,
    reject_sign_in: AtomicBool,
    fail_sign_out: AtomicBool,
}

impl ScriptedProvider {
    fn calls(&self) -> Vec<ProviderCall> {
        match self.calls.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, call: ProviderCall) {
        match self.calls.lock() {
            Ok(mut guard) => guard.push(call),
            Err(poisoned) => poisoned.into_inner().push(call),
        }
    }
}

#[async_trait]
impl AuthProvider for ScriptedProvider {
    async fn set_persistence(&self, mode: PersistenceMode) -> Result<(), AuthError> {
        self.record(ProviderCall::SetPersistence(mode));
        Ok(())
    }

    async fn sign_in(&self, credentials: &LoginCredentials) -> Result<Actor, AuthError> {
        self.record(ProviderCall::SignIn(credentials.email().to_owned()));
        if self.reject_sign_in.load(Ordering::SeqCst) {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(Actor::new("uid-1").with_email(credentials.email()))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.record(ProviderCall::SignOut);
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(AuthError::unavailable("offline"));
        }
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        self.record(ProviderCall::Reset(email.to_owned()));
        Ok(())
    }

    fn auth_state(&self) -> AuthStateStream {
        Box::pin(futures_util::stream::empty())
    }
}

fn credentials() -> LoginCredentials {
    LoginCredentials::try_from_parts("agent@example.com", "secret").expect("valid credentials")
}

#[rstest]
#[case(true, PersistenceMode::Durable)]
#[case(false, PersistenceMode::Ephemeral)]
#[tokio::test]
async fn login_selects_persistence_before_signing_in(
    #[case] persist: bool,
    #[case] expected: PersistenceMode,
) {
    let provider = Arc::new(ScriptedProvider::default());
    let session = SessionContext::new(provider.clone());

    let actor = session
        .login(credentials(), persist)
        .await
        .expect("login succeeds");
    assert_eq!(actor.email(), Some("agent@example.com"));
    assert_eq!(session.snapshot(), Some(actor));
    assert!(!session.is_loading());

    assert_eq!(
        provider.calls(),
        vec![
            ProviderCall::SetPersistence(expected),
            ProviderCall::SignIn("agent@example.com".to_owned()),
        ]
    );
}

#[tokio::test]
async fn failed_login_leaves_prior_session_untouched() {
    let provider = Arc::new(ScriptedProvider::default());
    let session = SessionContext::new(provider.clone());
    let signed_in = session
        .login(credentials(), true)
        .await
        .expect("first login succeeds");

    provider.reject_sign_in.store(true, Ordering::SeqCst);
    let err = session
        .login(credentials(), true)
        .await
        .expect_err("second login must fail");
    assert_eq!(err.code(), ErrorCode::Unauthorized);

    assert_eq!(session.snapshot(), Some(signed_in));
}

#[tokio::test]
async fn logout_clears_the_actor_even_when_the_provider_fails() {
    let provider = Arc::new(ScriptedProvider::default());
    provider.fail_sign_out.store(true, Ordering::SeqCst);
    let session = SessionContext::new(provider);
    session
        .login(credentials(), false)
        .await
        .expect("login succeeds");

    let err = session.logout().await.expect_err("sign-out fails");
    assert_eq!(err.code(), ErrorCode::Unavailable);
    assert_eq!(session.snapshot(), None);
}

#[tokio::test]
async fn reset_password_forwards_the_address() {
    let provider = Arc::new(ScriptedProvider::default());
    let session = SessionContext::new(provider.clone());
    session
        .reset_password("agent@example.com")
        .await
        .expect("reset succeeds");
    assert_eq!(
        provider.calls(),
        vec![ProviderCall::Reset("agent@example.com".to_owned())]
    );
}

#[tokio::test]
async fn watch_applies_auth_state_events() {
    let provider = Arc::new(ScriptedProvider::default());
    let session = SessionContext::new(provider);
    assert!(session.is_loading());

    let events: Vec<Option<Actor>> = vec![
        Some(Actor::new("uid-9").with_display_name("Restored")),
        None,
    ];
    session
        .watch(Box::pin(futures_util::stream::iter(events)))
        .await;

    assert_eq!(session.snapshot(), None);
    assert!(!session.is_loading());
}
