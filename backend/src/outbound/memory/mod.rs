//! In-process adapters for the document store, authentication provider and
//! object storage ports.
//!
//! These mirror the hosted collaborators closely enough to exercise every
//! repository contract: server-assigned identities and timestamps,
//! order-by/cursor/limit query evaluation, persistence-mode recording and
//! auth-state broadcast.

mod auth;
mod storage;
mod store;

pub use self::auth::InMemoryAuthProvider;
pub use self::storage::InMemoryObjectStorage;
pub use self::store::InMemoryDocumentStore;
