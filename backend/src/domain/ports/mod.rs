//! Domain ports defining the edges of the data-access layer.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the remote document store, the authentication provider, object
//! storage). Each trait exposes strongly typed errors so adapters map their
//! failures into predictable variants instead of returning `anyhow::Result`.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use pagination::Cursor;
use thiserror::Error;

use super::actor::Actor;
use super::auth::{LoginCredentials, PersistenceMode};
use super::document::{Document, RecordId, WriteFields};

/// Errors surfaced by document store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The addressed document does not exist.
    #[error("document {id} not found in {collection}")]
    NotFound {
        /// Collection that was addressed.
        collection: String,
        /// Identity that was addressed.
        id: String,
    },
    /// Connectivity or backend failure.
    #[error("document store unavailable: {message}")]
    Unavailable {
        /// Adapter-provided failure detail.
        message: String,
    },
    /// A query or write was rejected during execution.
    #[error("document store query failed: {message}")]
    Query {
        /// Adapter-provided failure detail.
        message: String,
    },
}

impl StoreError {
    /// Helper for missing-document failures.
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Helper for connectivity failures.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Helper for rejected queries and writes.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Sort direction of an ordered collection read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest order key first.
    Ascending,
    /// Largest order key first; the listing default.
    Descending,
}

/// One equality predicate pushed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    /// Field the predicate applies to.
    pub field: String,
    /// Value the field must equal.
    pub equals: serde_json::Value,
}

/// Ordering clause of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    /// Field supplying the order key.
    pub field: String,
    /// Sort direction over that key.
    pub direction: Direction,
}

/// A collection read: equality filters, one order-by, cursor, and limit.
///
/// # Examples
/// ```
/// use backoffice::domain::ports::QuerySpec;
///
/// let spec = QuerySpec::collection("clients")
///     .order_by_desc("date_created")
///     .limit(10);
/// assert_eq!(spec.collection_name(), "clients");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    collection: String,
    filters: Vec<FieldFilter>,
    order: Option<OrderBy>,
    start_after: Option<Cursor>,
    limit: Option<usize>,
}

impl QuerySpec {
    /// Start building a read over one collection.
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            filters: Vec::new(),
            order: None,
            start_after: None,
            limit: None,
        }
    }

    /// Add an equality predicate.
    #[must_use]
    pub fn where_eq(mut self, field: impl Into<String>, equals: serde_json::Value) -> Self {
        self.filters.push(FieldFilter {
            field: field.into(),
            equals,
        });
        self
    }

    /// Order descending by the given field.
    #[must_use]
    pub fn order_by_desc(mut self, field: impl Into<String>) -> Self {
        self.order = Some(OrderBy {
            field: field.into(),
            direction: Direction::Descending,
        });
        self
    }

    /// Resume after the document named by the cursor.
    #[must_use]
    pub fn start_after(mut self, cursor: Cursor) -> Self {
        self.start_after = Some(cursor);
        self
    }

    /// Cap the number of returned documents.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Collection the read targets.
    pub fn collection_name(&self) -> &str {
        self.collection.as_str()
    }

    /// Equality predicates in insertion order.
    pub fn filters(&self) -> &[FieldFilter] {
        self.filters.as_slice()
    }

    /// Ordering clause, if one was set.
    pub fn order(&self) -> Option<&OrderBy> {
        self.order.as_ref()
    }

    /// Cursor to resume after, if any.
    pub fn cursor(&self) -> Option<&Cursor> {
        self.start_after.as_ref()
    }

    /// Result cap, if one was set.
    pub fn max_results(&self) -> Option<usize> {
        self.limit
    }
}

/// Persistence port over the remote document database.
///
/// Queries support equality filters, order-by-timestamp, cursor resumption
/// and limits — the primitive set the repositories build their listing,
/// pagination and scan operations from. Write payloads may carry
/// server-timestamp sentinels resolved against the store's own clock.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document, returning it with its assigned identity and
    /// resolved timestamps.
    async fn add(&self, collection: &str, fields: WriteFields) -> Result<Document, StoreError>;

    /// Fetch one document by identity.
    async fn get(&self, collection: &str, id: &RecordId)
    -> Result<Option<Document>, StoreError>;

    /// Merge fields onto an existing document, returning the updated state.
    async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        fields: WriteFields,
    ) -> Result<Document, StoreError>;

    /// Permanently remove a document.
    async fn delete(&self, collection: &str, id: &RecordId) -> Result<(), StoreError>;

    /// Run an ordered, filtered, optionally paginated read.
    async fn query(&self, spec: QuerySpec) -> Result<Vec<Document>, StoreError>;
}

/// Errors surfaced by authentication provider adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The credential exchange was rejected.
    #[error("credentials were rejected")]
    InvalidCredentials,
    /// The provider could not be reached.
    #[error("authentication provider unavailable: {message}")]
    Unavailable {
        /// Adapter-provided failure detail.
        message: String,
    },
}

impl AuthError {
    /// Helper for provider outages.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Stream of auth-state changes pushed by the provider.
///
/// `Some(actor)` on sign-in and session restoration, `None` on sign-out.
pub type AuthStateStream = BoxStream<'static, Option<Actor>>;

/// Port over the hosted authentication provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Select session persistence; called before every credential exchange.
    async fn set_persistence(&self, mode: PersistenceMode) -> Result<(), AuthError>;

    /// Exchange credentials for an authenticated actor.
    async fn sign_in(&self, credentials: &LoginCredentials) -> Result<Actor, AuthError>;

    /// End the provider-side session.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Send a password-reset email for the given address.
    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// Subscribe to auth-state changes; consumed once at process start.
    fn auth_state(&self) -> AuthStateStream;
}

/// Errors surfaced by object storage adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectStorageError {
    /// The storage backend rejected or failed the operation.
    #[error("object storage failure: {message}")]
    Backend {
        /// Adapter-provided failure detail.
        message: String,
    },
}

impl ObjectStorageError {
    /// Helper for backend-level failures.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Port over the blob store holding profile images.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store bytes under the given key, replacing any existing object.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), ObjectStorageError>;

    /// Remove the object under the given key, if present.
    async fn delete(&self, key: &str) -> Result<(), ObjectStorageError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn query_spec_accumulates_clauses() {
        let cursor = Cursor::new(json!({ "seconds": 5, "nanos": 0 }), "last-doc");
        let spec = QuerySpec::collection("clients")
            .where_eq("is_deleted", json!(false))
            .order_by_desc("date_created")
            .start_after(cursor.clone())
            .limit(25);

        assert_eq!(spec.collection_name(), "clients");
        assert_eq!(spec.filters().len(), 1);
        assert_eq!(
            spec.order().map(|order| order.direction),
            Some(Direction::Descending)
        );
        assert_eq!(spec.cursor(), Some(&cursor));
        assert_eq!(spec.max_results(), Some(25));
    }

    #[rstest]
    fn store_error_helpers_fill_variants() {
        assert_eq!(
            StoreError::not_found("clients", "c-1"),
            StoreError::NotFound {
                collection: "clients".to_owned(),
                id: "c-1".to_owned(),
            }
        );
        assert!(matches!(
            StoreError::unavailable("offline"),
            StoreError::Unavailable { .. }
        ));
    }
}
