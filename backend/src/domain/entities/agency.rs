//! Partner agency records.

use serde::{Deserialize, Serialize};

use crate::domain::audit::AuditTrail;
use crate::domain::document::RecordId;
use crate::domain::entity::{
    Entity, SearchTerm, opt_exact_matches, opt_text_matches, text_matches,
};

/// A partner agency in the `agencies` collection. No soft delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agency {
    /// Store-assigned identity, unassigned on drafts.
    #[serde(skip)]
    pub id: RecordId,
    /// Agency name.
    #[serde(rename = "agencies_name")]
    pub name: String,
    /// Contact email address.
    #[serde(rename = "agencies_email", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact phone number.
    #[serde(rename = "agencies_tel", default, skip_serializing_if = "Option::is_none")]
    pub tel: Option<String>,
    /// City of the agency's office.
    #[serde(rename = "agencies_city", default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Country of the agency's office.
    #[serde(rename = "agencies_country", default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Server-assigned audit fields.
    #[serde(flatten)]
    pub audit: AuditTrail,
}

impl Agency {
    /// Draft a new agency with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RecordId::default(),
            name: name.into(),
            email: None,
            tel: None,
            city: None,
            country: None,
            audit: AuditTrail::default(),
        }
    }
}

impl Entity for Agency {
    const COLLECTION: &'static str = "agencies";
    const LABEL: &'static str = "agency";

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
            || opt_text_matches(self.city.as_deref(), term)
            || opt_text_matches(self.country.as_deref(), term)
    }
}
