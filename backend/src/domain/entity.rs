//! The entity contract shared by all seven back-office collections.
//!
//! A record type plugs into the generic repository by naming its collection
//! and label, exposing identity and audit accessors, and deciding which of
//! its fields a search term is matched against. Soft-delete-capable types
//! additionally implement [`SoftDeletable`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::audit::AuditTrail;
use super::document::RecordId;

/// Error returned when a search term is blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptySearchTerm;

impl fmt::Display for EmptySearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "search term must not be empty")
    }
}

impl std::error::Error for EmptySearchTerm {}

/// A validated, pre-folded search term.
///
/// Holds both the trimmed original (for exact matching of fields like phone
/// numbers, which have no case) and a lowercase fold used for the
/// case-insensitive substring matches everywhere else.
///
/// # Examples
/// ```
/// use backoffice::domain::SearchTerm;
///
/// let term = SearchTerm::new("  Ahmed ").unwrap();
/// assert_eq!(term.as_str(), "Ahmed");
/// assert_eq!(term.folded(), "ahmed");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    raw: String,
    folded: String,
}

impl SearchTerm {
    /// Validate and fold a raw term.
    pub fn new(raw: &str) -> Result<Self, EmptySearchTerm> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmptySearchTerm);
        }
        Ok(Self {
            raw: trimmed.to_owned(),
            folded: trimmed.to_lowercase(),
        })
    }

    /// The trimmed original term.
    pub fn as_str(&self) -> &str {
        self.raw.as_str()
    }

    /// The lowercase fold of the term.
    pub fn folded(&self) -> &str {
        self.folded.as_str()
    }
}

/// Case-insensitive substring match against one field value.
pub fn text_matches(value: &str, term: &SearchTerm) -> bool {
    value.to_lowercase().contains(term.folded())
}

/// Case-sensitive substring match, for fields with no meaningful case.
pub fn exact_matches(value: &str, term: &SearchTerm) -> bool {
    value.contains(term.as_str())
}

/// [`text_matches`] lifted over optional fields.
pub fn opt_text_matches(value: Option<&str>, term: &SearchTerm) -> bool {
    value.is_some_and(|field| text_matches(field, term))
}

/// [`exact_matches`] lifted over optional fields.
pub fn opt_exact_matches(value: Option<&str>, term: &SearchTerm) -> bool {
    value.is_some_and(|field| exact_matches(field, term))
}

/// A typed record stored in one remote collection.
pub trait Entity:
    Clone + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Remote collection name.
    const COLLECTION: &'static str;

    /// Human label used in user-facing messages ("client", "hotel", ...).
    const LABEL: &'static str;

    /// Whether this collection participates in soft delete.
    const SOFT_DELETE: bool = false;

    /// Store-assigned identity, unassigned on drafts.
    fn id(&self) -> &RecordId;

    /// Record the store-assigned identity after a read or create.
    fn set_id(&mut self, id: RecordId);

    /// Audit fields shared by every record.
    fn audit(&self) -> &AuditTrail;

    /// Whether the searchable fields of this record match the term.
    fn matches(&self, term: &SearchTerm) -> bool;

    /// Soft-delete flag; always false for collections without the trail.
    fn is_deleted(&self) -> bool {
        false
    }
}

/// Extension for collections carrying the soft-delete trail.
pub trait SoftDeletable: Entity {
    /// When the record was soft-deleted, if it is.
    fn date_deleted(&self) -> Option<DateTime<Utc>>;

    /// Flip the soft-delete state, stamping or clearing the deletion time.
    fn set_deleted(&mut self, deleted: bool, date_deleted: Option<DateTime<Utc>>);
}
