//! The client record: travellers managed by the agency.

use serde::{Deserialize, Serialize};

use crate::domain::audit::{AuditTrail, SoftDeleteTrail};
use crate::domain::document::RecordId;
use crate::domain::entity::{
    Entity, SearchTerm, SoftDeletable, opt_exact_matches, opt_text_matches, text_matches,
};

/// Lifecycle status shown on client listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    /// The client can be booked onto packages and flights.
    #[default]
    Active,
    /// The client is kept for history but not offered bookings.
    Inactive,
}

impl ClientStatus {
    /// Returns the wire string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A traveller record in the `clients` collection.
///
/// Domain fields are free-form strings captured from the intake form; only
/// the name is required. Clients participate in soft delete, so they carry
/// the tombstone trail alongside the audit trail.
///
/// # Examples
/// ```
/// use backoffice::domain::entities::{Client, ClientStatus};
///
/// let client = Client::new("Ahmed");
/// assert_eq!(client.status, ClientStatus::Active);
/// assert!(!client.id.is_assigned());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Store-assigned identity, unassigned on drafts.
    #[serde(skip)]
    pub id: RecordId,
    /// Full name of the traveller.
    #[serde(rename = "clients_name")]
    pub name: String,
    /// Contact email address.
    #[serde(rename = "clients_email", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact phone number.
    #[serde(rename = "clients_tel", default, skip_serializing_if = "Option::is_none")]
    pub tel: Option<String>,
    /// Postal address.
    #[serde(rename = "clients_address", default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Passport number.
    #[serde(rename = "clients_passport", default, skip_serializing_if = "Option::is_none")]
    pub passport: Option<String>,
    /// National identity card number.
    #[serde(rename = "clients_cin", default, skip_serializing_if = "Option::is_none")]
    pub cin: Option<String>,
    /// City of residence.
    #[serde(rename = "clients_city", default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Country of residence.
    #[serde(rename = "clients_country", default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Lifecycle status, defaulting to active on creation.
    #[serde(rename = "clients_status", default)]
    pub status: ClientStatus,
    /// Server-assigned audit fields.
    #[serde(flatten)]
    pub audit: AuditTrail,
    /// Soft-delete tombstone.
    #[serde(flatten)]
    pub tombstone: SoftDeleteTrail,
}

impl Client {
    /// Draft a new active client with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RecordId::default(),
            name: name.into(),
            email: None,
            tel: None,
            address: None,
            passport: None,
            cin: None,
            city: None,
            country: None,
            status: ClientStatus::Active,
            audit: AuditTrail::default(),
            tombstone: SoftDeleteTrail::default(),
        }
    }
}

impl Entity for Client {
    const COLLECTION: &'static str = "clients";
    const LABEL: &'static str = "client";
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

    // Phone numbers are matched exactly; everything else folds case.
    fn matches(&self, term: &SearchTerm) -> bool {
        text_matches(&self.name, term)
            || opt_text_matches(self.email.as_deref(), term)
            || opt_exact_matches(self.tel.as_deref(), term)
            || opt_text_matches(self.address.as_deref(), term)
            || opt_text_matches(self.passport.as_deref(), term)
            || opt_text_matches(self.cin.as_deref(), term)
            || opt_text_matches(self.city.as_deref(), term)
            || opt_text_matches(self.country.as_deref(), term)
    }

    fn is_deleted(&self) -> bool {
        self.tombstone.is_deleted
    }
}

impl SoftDeletable for Client {
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
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn new_clients_default_to_active() {
        let client = Client::new("Ahmed");
        assert_eq!(client.status, ClientStatus::Active);
        assert!(!client.is_deleted());
    }

    #[rstest]
    fn wire_names_use_the_collection_prefix() {
        let mut client = Client::new("Ahmed");
        client.tel = Some("0600000000".to_owned());
        let value = serde_json::to_value(&client).expect("serialises");
        assert_eq!(value["clients_name"], json!("Ahmed"));
        assert_eq!(value["clients_tel"], json!("0600000000"));
        assert_eq!(value["clients_status"], json!("active"));
        assert_eq!(value["is_deleted"], json!(false));
    }

    #[rstest]
    #[case("ahmed", true)]
    #[case("0600", true)]
    #[case("casablanca", true)]
    #[case("0699", false)]
    fn search_covers_the_documented_fields(#[case] raw: &str, #[case] expected: bool) {
        let mut client = Client::new("Ahmed Ben Ali");
        client.tel = Some("0600000000".to_owned());
        client.city = Some("Casablanca".to_owned());
        let term = SearchTerm::new(raw).expect("non-empty");
        assert_eq!(client.matches(&term), expected);
    }

    #[rstest]
    fn phone_matching_is_case_sensitive_substring() {
        let mut client = Client::new("x");
        client.tel = Some("0600000000".to_owned());
        // A folded term that would hit a case-insensitive field must not
        // change phone semantics.
        let term = SearchTerm::new("00000").expect("non-empty");
        assert!(client.matches(&term));
    }
}
