//! Back-office operator accounts stored in the `users` collection.

use serde::{Deserialize, Serialize};

use crate::domain::audit::{AuditTrail, SoftDeleteTrail};
use crate::domain::document::RecordId;
use crate::domain::entity::{
    Entity, SearchTerm, SoftDeletable, opt_exact_matches, opt_text_matches, text_matches,
};

/// An operator account managed from the users screen.
///
/// Distinct from [`crate::domain::Actor`]: the actor is the provider-side
/// identity of whoever is signed in, while this record is the agency's own
/// directory entry for an operator. Users participate in soft delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffUser {
    /// Store-assigned identity, unassigned on drafts.
    #[serde(skip)]
    pub id: RecordId,
    /// Display name shown in listings.
    #[serde(rename = "users_name")]
    pub name: String,
    /// Sign-in email address.
    #[serde(rename = "users_email", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact phone number.
    #[serde(rename = "users_tel", default, skip_serializing_if = "Option::is_none")]
    pub tel: Option<String>,
    /// Free-form role label ("admin", "agent", ...).
    #[serde(rename = "users_role", default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Object-storage key of the profile image, when one was uploaded.
    #[serde(rename = "users_photo", default, skip_serializing_if = "Option::is_none")]
    pub photo_key: Option<String>,
    /// Server-assigned audit fields.
    #[serde(flatten)]
    pub audit: AuditTrail,
    /// Soft-delete tombstone.
    #[serde(flatten)]
    pub tombstone: SoftDeleteTrail,
}

impl StaffUser {
    /// Draft a new operator account with the given display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RecordId::default(),
            name: name.into(),
            email: None,
            tel: None,
            role: None,
            photo_key: None,
            audit: AuditTrail::default(),
            tombstone: SoftDeleteTrail::default(),
        }
    }
}

impl Entity for StaffUser {
    const COLLECTION: &'static str = "users";
    const LABEL: &'static str = "user";
    const SOFT_DELETE: bool = true;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn audit(&self) -> &AuditTrail {
        &self.audit
    }

    fn matches(&self, term: &SearchTerm) -> bool {
        text_matches(&self.name, term)
            || opt_text_matches(self.email.as_deref(), term)
            || opt_exact_matches(self.tel.as_deref(), term)
            || opt_text_matches(self.role.as_deref(), term)
    }

    fn is_deleted(&self) -> bool {
        self.tombstone.is_deleted
    }
}

impl SoftDeletable for StaffUser {
    fn date_deleted(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.tombstone.date_deleted
    }

    fn set_deleted(&mut self, deleted: bool, date_deleted: Option<chrono::DateTime<chrono::Utc>>) {
        self.tombstone.is_deleted = deleted;
        self.tombstone.date_deleted = date_deleted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("admin", true)]
    #[case("fatima", true)]
    #[case("0612", true)]
    #[case("nobody", false)]
    fn search_covers_name_email_phone_and_role(#[case] raw: &str, #[case] expected: bool) {
        let mut user = StaffUser::new("Fatima Z");
        user.role = Some("Admin".to_owned());
        user.tel = Some("0612345678".to_owned());
        let term = SearchTerm::new(raw).expect("non-empty");
        assert_eq!(user.matches(&term), expected);
    }
}
