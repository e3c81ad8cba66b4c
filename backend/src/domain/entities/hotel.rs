//! Hotel inventory records.

use serde::{Deserialize, Serialize};

use crate::domain::audit::AuditTrail;
use crate::domain::document::RecordId;
use crate::domain::entity::{Entity, SearchTerm, opt_text_matches, text_matches};

/// A bookable hotel in the `hotels` collection. No soft delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    /// Store-assigned identity, unassigned on drafts.
    #[serde(skip)]
    pub id: RecordId,
    /// Hotel name.
    #[serde(rename = "hotels_name")]
    pub name: String,
    /// City of the hotel.
    #[serde(rename = "hotels_city", default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Country of the hotel.
    #[serde(rename = "hotels_country", default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Star rating, when graded.
    #[serde(rename = "hotels_stars", default, skip_serializing_if = "Option::is_none")]
    pub stars: Option<u8>,
    /// Nightly rate in the agency's booking currency.
    #[serde(rename = "hotels_price", default, skip_serializing_if = "Option::is_none")]
    pub price_per_night: Option<f64>,
    /// Server-assigned audit fields.
    #[serde(flatten)]
    pub audit: AuditTrail,
}

impl Hotel {
    /// Draft a new hotel with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RecordId::default(),
            name: name.into(),
            city: None,
            country: None,
            stars: None,
            price_per_night: None,
            audit: AuditTrail::default(),
        }
    }
}

impl Entity for Hotel {
    const COLLECTION: &'static str = "hotels";
    const LABEL: &'static str = "hotel";

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
            || opt_text_matches(self.city.as_deref(), term)
            || opt_text_matches(self.country.as_deref(), term)
    }
}
