//! The authenticated actor behind a back-office session.

use serde::{Deserialize, Serialize};

/// Identity of the signed-in back-office operator.
///
/// Supplied by the authentication provider after a credential exchange and
/// snapshotted by repositories when stamping `created_by` on new records.
///
/// # Examples
/// ```
/// use backoffice::domain::Actor;
///
/// let actor = Actor::new("uid-1")
///     .with_email("agent@example.com")
///     .with_display_name("Agent");
/// assert_eq!(actor.uid(), "uid-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
}

impl Actor {
    /// Build an actor from its provider-assigned uid.
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
        }
    }

    /// Attach the actor's email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Attach the actor's display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Provider-assigned unique identifier.
    pub fn uid(&self) -> &str {
        self.uid.as_str()
    }

    /// Email address, when the provider exposes one.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Display name, when the provider exposes one.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}
