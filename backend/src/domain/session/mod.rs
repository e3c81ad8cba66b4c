//! The process-wide session context.
//!
//! Holds the single signed-in actor (or none). Repositories read it — never
//! mutate it — to snapshot `created_by` at the moment of `create`. The
//! context itself is driven by explicit login/logout calls plus the
//! provider's auth-state stream, subscribed once at process start.

use std::sync::{Arc, Mutex};

use futures_util::StreamExt;

use super::actor::Actor;
use super::auth::{LoginCredentials, PersistenceMode};
use super::error::Error;
use super::messages;
use super::ports::{AuthError, AuthProvider, AuthStateStream};

#[derive(Debug, Default)]
struct SessionState {
    actor: Option<Actor>,
    loading: bool,
}

/// Read-mostly holder of the authenticated actor.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
/// use backoffice::domain::{LoginCredentials, SessionContext};
/// use backoffice::outbound::memory::InMemoryAuthProvider;
///
/// # async fn demo() -> Result<(), backoffice::domain::Error> {
/// let provider = Arc::new(InMemoryAuthProvider::new());
/// let session = SessionContext::new(provider);
/// let creds = LoginCredentials::try_from_parts("agent@example.com", "secret")
///     .map_err(|err| backoffice::domain::Error::invalid_request(err.to_string()))?;
/// session.login(creds, true).await?;
/// assert!(session.snapshot().is_some());
/// # Ok(())
/// # }
/// ```
pub struct SessionContext {
    provider: Arc<dyn AuthProvider>,
    state: Mutex<SessionState>,
}

impl SessionContext {
    /// Create a context over the given provider, initially loading.
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self {
            provider,
            state: Mutex::new(SessionState {
                actor: None,
                loading: true,
            }),
        }
    }

    /// Exchange credentials for a session.
    ///
    /// The persistence mode is selected from the `persist` flag *before*
    /// the credential exchange is attempted. Failure leaves any prior
    /// session state untouched.
    pub async fn login(
        &self,
        credentials: LoginCredentials,
        persist: bool,
    ) -> Result<Actor, Error> {
        let mode = PersistenceMode::from_remember_me(persist);
        self.provider
            .set_persistence(mode)
            .await
            .map_err(map_auth_error)?;

        let actor = self
            .provider
            .sign_in(&credentials)
            .await
            .map_err(|err| {
                tracing::warn!(email = credentials.email(), error = %err, "login rejected");
                map_auth_error(err)
            })?;

        self.apply(Some(actor.clone()));
        Ok(actor)
    }

    /// End the session, clearing the actor unconditionally.
    ///
    /// The local actor is dropped even when the provider-side sign-out
    /// fails; the failure is still reported to the caller.
    pub async fn logout(&self) -> Result<(), Error> {
        let result = self.provider.sign_out().await;
        self.apply(None);
        result.map_err(|err| {
            tracing::warn!(error = %err, "provider sign-out failed");
            map_auth_error(err)
        })
    }

    /// Ask the provider to send a password-reset email.
    pub async fn reset_password(&self, email: &str) -> Result<(), Error> {
        self.provider
            .send_password_reset(email)
            .await
            .map_err(map_auth_error)
    }

    /// Drive `actor`/`loading` from the provider's auth-state stream.
    ///
    /// Runs until the stream ends; spawn it once at process start.
    pub async fn watch(&self, mut stream: AuthStateStream) {
        while let Some(actor) = stream.next().await {
            self.apply(actor);
        }
    }

    /// Snapshot of the current actor, read by repositories at create time.
    pub fn snapshot(&self) -> Option<Actor> {
        self.lock().actor.clone()
    }

    /// Whether the initial auth state is still being established.
    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    fn apply(&self, actor: Option<Actor>) {
        let mut state = self.lock();
        state.actor = actor;
        state.loading = false;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        // Held only across field reads/writes; a poisoned lock means a
        // panic mid-assignment, which cannot happen here.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn map_auth_error(error: AuthError) -> Error {
    match error {
        AuthError::InvalidCredentials => Error::unauthorized(messages::login_failed()),
        AuthError::Unavailable { .. } => Error::unavailable(messages::auth_unavailable()),
    }
}

#[cfg(test)]
mod tests;
