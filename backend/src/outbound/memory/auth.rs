//! In-memory authentication provider adapter.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::Actor;
use crate::domain::auth::{LoginCredentials, PersistenceMode};
use crate::domain::ports::{AuthError, AuthProvider, AuthStateStream};

const EVENT_BUFFER: usize = 16;

/// Credential-map authentication provider.
///
/// Records the persistence mode selected before each exchange and
/// broadcasts auth-state changes to every subscribed stream, mirroring the
/// hosted provider's observer.
pub struct InMemoryAuthProvider {
    accounts: Mutex<HashMap<String, (String, Actor)>>,
    persistence: Mutex<Option<PersistenceMode>>,
    resets: Mutex<Vec<String>>,
    events: broadcast::Sender<Option<Actor>>,
}

impl InMemoryAuthProvider {
    /// Create a provider with no registered accounts.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            accounts: Mutex::new(HashMap::new()),
            persistence: Mutex::new(None),
            resets: Mutex::new(Vec::new()),
            events,
        }
    }

    /// Register an account the provider will accept.
    pub fn register(&self, email: impl Into<String>, password: impl Into<String>, actor: Actor) {
        lock(&self.accounts).insert(email.into(), (password.into(), actor));
    }

    /// The persistence mode selected by the most recent login attempt.
    pub fn last_persistence(&self) -> Option<PersistenceMode> {
        *lock(&self.persistence)
    }

    /// Addresses password-reset emails were requested for.
    pub fn password_resets(&self) -> Vec<String> {
        lock(&self.resets).clone()
    }
}

impl Default for InMemoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn set_persistence(&self, mode: PersistenceMode) -> Result<(), AuthError> {
        *lock(&self.persistence) = Some(mode);
        Ok(())
    }

    async fn sign_in(&self, credentials: &LoginCredentials) -> Result<Actor, AuthError> {
        let accounts = lock(&self.accounts);
        let Some((password, actor)) = accounts.get(credentials.email()) else {
            return Err(AuthError::InvalidCredentials);
        };
        if password != credentials.password() {
            return Err(AuthError::InvalidCredentials);
        }
        let actor = actor.clone();
        drop(accounts);
        let _ = self.events.send(Some(actor.clone()));
        Ok(actor)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let _ = self.events.send(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        lock(&self.resets).push(email.to_owned());
        Ok(())
    }

    fn auth_state(&self) -> AuthStateStream {
        let receiver = self.events.subscribe();
        Box::pin(futures_util::stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => return Some((event, receiver)),
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use futures_util::StreamExt;

    fn credentials(email: &str, password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts(email, password).expect("valid credentials")
    }

    #[tokio::test]
    async fn sign_in_checks_the_registered_password() {
        let provider = InMemoryAuthProvider::new();
        provider.register("agent@example.com", "secret", Actor::new("uid-1"));

        let actor = provider
            .sign_in(&credentials("agent@example.com", "secret"))
            .await
            .expect("sign-in succeeds");
        assert_eq!(actor.uid(), "uid-1");

        let err = provider
            .sign_in(&credentials("agent@example.com", "wrong"))
            .await
            .expect_err("wrong password rejected");
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn auth_state_broadcasts_sign_in_and_out() {
        let provider = InMemoryAuthProvider::new();
        provider.register("agent@example.com", "secret", Actor::new("uid-1"));
        let mut stream = provider.auth_state();

        provider
            .sign_in(&credentials("agent@example.com", "secret"))
            .await
            .expect("sign-in succeeds");
        provider.sign_out().await.expect("sign-out succeeds");

        let first = stream.next().await.flatten();
        assert_eq!(first.map(|actor| actor.uid().to_owned()), Some("uid-1".to_owned()));
        assert_eq!(stream.next().await, Some(None));
    }

    #[tokio::test]
    async fn persistence_and_resets_are_recorded() {
        let provider = InMemoryAuthProvider::new();
        provider
            .set_persistence(PersistenceMode::Ephemeral)
            .await
            .expect("persistence set");
        provider
            .send_password_reset("agent@example.com")
            .await
            .expect("reset requested");

        assert_eq!(provider.last_persistence(), Some(PersistenceMode::Ephemeral));
        assert_eq!(provider.password_resets(), vec!["agent@example.com".to_owned()]);
    }
}
