//! Ancillary service records (visas, transfers, insurance, ...).

use serde::{Deserialize, Serialize};

use crate::domain::audit::AuditTrail;
use crate::domain::document::RecordId;
use crate::domain::entity::{Entity, SearchTerm, opt_text_matches, text_matches};

/// A sellable service in the `services` collection. No soft delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelService {
    /// Store-assigned identity, unassigned on drafts.
    #[serde(skip)]
    pub id: RecordId,
    /// Service name shown in listings.
    #[serde(rename = "services_name")]
    pub name: String,
    /// Free-form category label.
    #[serde(rename = "services_category", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Price in the agency's booking currency.
    #[serde(rename = "services_price", default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Longer description shown on the detail page.
    #[serde(rename = "services_description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Server-assigned audit fields.
    #[serde(flatten)]
    pub audit: AuditTrail,
}

impl TravelService {
    /// Draft a new service with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RecordId::default(),
            name: name.into(),
            category: None,
            price: None,
            description: None,
            audit: AuditTrail::default(),
        }
    }
}

impl Entity for TravelService {
    const COLLECTION: &'static str = "services";
    const LABEL: &'static str = "service";

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
        text_matches(&self.name, term) || opt_text_matches(self.category.as_deref(), term)
    }
}
