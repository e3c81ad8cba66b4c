//! Flight inventory records.

use serde::{Deserialize, Serialize};

use crate::domain::audit::AuditTrail;
use crate::domain::document::RecordId;
use crate::domain::entity::{
    Entity, SearchTerm, opt_exact_matches, opt_text_matches, text_matches,
};

/// A sellable flight in the `flights` collection. No soft delete.
///
/// Departure and arrival are free-form strings exactly as captured from the
/// booking form; the screens never compute on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    /// Store-assigned identity, unassigned on drafts.
    #[serde(skip)]
    pub id: RecordId,
    /// Operating airline.
    #[serde(rename = "flights_airline")]
    pub airline: String,
    /// Flight number, matched exactly in search.
    #[serde(rename = "flights_number", default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Departure airport or city.
    #[serde(rename = "flights_origin", default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Arrival airport or city.
    #[serde(rename = "flights_destination", default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    /// Departure time as entered on the form.
    #[serde(rename = "flights_departure", default, skip_serializing_if = "Option::is_none")]
    pub departure: Option<String>,
    /// Arrival time as entered on the form.
    #[serde(rename = "flights_arrival", default, skip_serializing_if = "Option::is_none")]
    pub arrival: Option<String>,
    /// Seat price in the agency's booking currency.
    #[serde(rename = "flights_price", default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Seats available for sale.
    #[serde(rename = "flights_seats", default, skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,
    /// Server-assigned audit fields.
    #[serde(flatten)]
    pub audit: AuditTrail,
}

impl Flight {
    /// Draft a new flight for the given airline.
    pub fn new(airline: impl Into<String>) -> Self {
        Self {
            id: RecordId::default(),
            airline: airline.into(),
            number: None,
            origin: None,
            destination: None,
            departure: None,
            arrival: None,
            price: None,
            seats: None,
            audit: AuditTrail::default(),
        }
    }
}

impl Entity for Flight {
    const COLLECTION: &'static str = "flights";
    const LABEL: &'static str = "flight";

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
        text_matches(&self.airline, term)
            || opt_exact_matches(self.number.as_deref(), term)
            || opt_text_matches(self.origin.as_deref(), term)
            || opt_text_matches(self.destination.as_deref(), term)
    }
}
