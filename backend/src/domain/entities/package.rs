//! Travel package records.

use serde::{Deserialize, Serialize};

use crate::domain::audit::AuditTrail;
use crate::domain::document::RecordId;
use crate::domain::entity::{Entity, SearchTerm, opt_text_matches, text_matches};

/// A composed travel offer in the `packages` collection. No soft delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelPackage {
    /// Store-assigned identity, unassigned on drafts.
    #[serde(skip)]
    pub id: RecordId,
    /// Package title shown in listings.
    #[serde(rename = "packages_title")]
    pub title: String,
    /// Marketing description.
    #[serde(rename = "packages_description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Destination the package covers.
    #[serde(rename = "packages_destination", default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    /// Duration in days.
    #[serde(rename = "packages_duration", default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    /// Package price in the agency's booking currency.
    #[serde(rename = "packages_price", default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Server-assigned audit fields.
    #[serde(flatten)]
    pub audit: AuditTrail,
}

impl TravelPackage {
    /// Draft a new package with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: RecordId::default(),
            title: title.into(),
            description: None,
            destination: None,
            duration_days: None,
            price: None,
            audit: AuditTrail::default(),
        }
    }
}

impl Entity for TravelPackage {
    const COLLECTION: &'static str = "packages";
    const LABEL: &'static str = "package";

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
        text_matches(&self.title, term)
            || opt_text_matches(self.destination.as_deref(), term)
            || opt_text_matches(self.description.as_deref(), term)
    }
}
