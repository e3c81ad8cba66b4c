//! The generic entity repository.
//!
//! One parameterised implementation replaces the per-entity store modules
//! of the original screens: each entity type plugs in its collection name,
//! label, searchable fields and (for clients and users) the soft-delete
//! trail, and gets the full list/fetch/create/update/soft-delete/restore/
//! search surface with identical consistency semantics.
//!
//! ## Cache discipline
//!
//! The repository owns an active list, a deleted list, a current-record
//! slot and one pagination cursor per list. Every operation catches remote
//! failures at its own boundary, normalises them into [`Error`], mirrors
//! the message into `last_error`, and resets `is_loading` on every exit
//! path. On failure the cached lists are never partially mutated.
//!
//! Overlapping list reads are sequenced with per-list request tokens: a
//! response that is no longer the latest issued request for its target list
//! is discarded instead of clobbering newer state.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use pagination::Cursor;
use serde_json::{Value, json};

use super::audit::CreatedBy;
use super::document::{
    Document, FIELD_CREATED_BY, FIELD_DATE_CREATED, FIELD_DATE_DELETED, FIELD_DATE_UPDATED,
    FIELD_IS_DELETED, Patch, RecordId, WriteFields,
};
use super::entity::{Entity, SearchTerm, SoftDeletable};
use super::error::Error;
use super::messages;
use super::ports::{DocumentStore, QuerySpec, StoreError};
use super::session::SessionContext;

/// Search results partitioned by soft-delete state.
///
/// For collections without soft delete the deleted partition is always
/// empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults<E> {
    /// Matching records with `is_deleted == false`.
    pub active: Vec<E>,
    /// Matching records with `is_deleted == true`.
    pub deleted: Vec<E>,
}

#[derive(Debug)]
struct ListState<E> {
    records: Vec<E>,
    cursor: Option<Cursor>,
    issued: u64,
}

impl<E> Default for ListState<E> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            cursor: None,
            issued: 0,
        }
    }
}

#[derive(Debug)]
struct RepoState<E> {
    active: ListState<E>,
    deleted: ListState<E>,
    current: Option<E>,
    is_loading: bool,
    last_error: Option<String>,
}

impl<E> Default for RepoState<E> {
    fn default() -> Self {
        Self {
            active: ListState::default(),
            deleted: ListState::default(),
            current: None,
            is_loading: false,
            last_error: None,
        }
    }
}

/// Cache-backed data access for one entity collection.
///
/// Construct one instance per collection and share it behind an [`Arc`];
/// callers that page independently should construct their own instance, as
/// the cursors are per-instance state.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
/// use backoffice::domain::entities::Client;
/// use backoffice::domain::{Repository, SessionContext};
/// use backoffice::outbound::memory::{InMemoryAuthProvider, InMemoryDocumentStore};
///
/// # async fn demo() -> Result<(), backoffice::domain::Error> {
/// let store = Arc::new(InMemoryDocumentStore::new());
/// let session = Arc::new(SessionContext::new(Arc::new(InMemoryAuthProvider::new())));
/// let clients = Repository::<Client>::new(store, session);
/// let stored = clients.create(Client::new("Ahmed")).await?;
/// assert!(stored.id.is_assigned());
/// # Ok(())
/// # }
/// ```
pub struct Repository<E: Entity> {
    store: Arc<dyn DocumentStore>,
    session: Arc<SessionContext>,
    state: Mutex<RepoState<E>>,
}

impl<E: Entity> Repository<E> {
    /// Wire a repository to its store and the shared session context.
    pub fn new(store: Arc<dyn DocumentStore>, session: Arc<SessionContext>) -> Self {
        Self {
            store,
            session,
            state: Mutex::new(RepoState::default()),
        }
    }

    /// Snapshot of the cached active records.
    pub fn records(&self) -> Vec<E> {
        self.lock().active.records.clone()
    }

    /// Snapshot of the cached soft-deleted records.
    pub fn deleted_records(&self) -> Vec<E> {
        self.lock().deleted.records.clone()
    }

    /// The record loaded by the last [`Repository::fetch_one`], if any.
    pub fn current(&self) -> Option<E> {
        self.lock().current.clone()
    }

    /// Whether an operation is in flight.
    pub fn is_loading(&self) -> bool {
        self.lock().is_loading
    }

    /// Message of the last failed operation, for passive display.
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Create a record, stamping audit fields and caching the result.
    ///
    /// The `created_by` stub is snapshotted from the session at this
    /// moment; the timestamps are the store's authoritative server-assigned
    /// values read back from the write.
    pub async fn create(&self, draft: E) -> Result<E, Error> {
        self.begin();
        let fields = match self.creation_fields(&draft) {
            Ok(fields) => fields,
            Err(err) => return Err(self.fail_domain(err)),
        };

        match self.store.add(E::COLLECTION, fields).await {
            Ok(doc) => {
                let stored = match Self::decode(&doc) {
                    Ok(stored) => stored,
                    Err(err) => return Err(self.fail_domain(err)),
                };
                let mut state = self.lock();
                state.active.records.insert(0, stored.clone());
                state.is_loading = false;
                drop(state);
                Ok(stored)
            }
            Err(err) => Err(self.fail("create", &err)),
        }
    }

    /// Load one record by identity into the current slot.
    pub async fn fetch_one(&self, id: &RecordId) -> Result<E, Error> {
        self.begin();
        match self.store.get(E::COLLECTION, id).await {
            Ok(Some(doc)) => {
                let record = match Self::decode(&doc) {
                    Ok(record) => record,
                    Err(err) => return Err(self.fail_domain(err)),
                };
                let mut state = self.lock();
                state.current = Some(record.clone());
                state.is_loading = false;
                drop(state);
                Ok(record)
            }
            Ok(None) => {
                let err = Error::not_found(messages::not_found(E::LABEL));
                let mut state = self.lock();
                state.current = None;
                state.last_error = Some(err.message().to_owned());
                state.is_loading = false;
                drop(state);
                Err(err)
            }
            Err(err) => Err(self.fail("fetch_one", &err)),
        }
    }

    /// Fetch the next page of active records, ordered by creation time
    /// descending.
    ///
    /// `reset` clears the active list and its cursor before querying; the
    /// follow-up call continues after the last document seen. For
    /// soft-delete-capable collections the deleted records are filtered
    /// out here, after retrieval — the repository does not assume the
    /// store enforces the flag.
    pub async fn fetch_many(&self, page_size: usize, reset: bool) -> Result<Vec<E>, Error> {
        let (token, start_after) = {
            let mut state = self.lock();
            state.is_loading = true;
            state.last_error = None;
            if reset {
                state.active.records.clear();
                state.active.cursor = None;
            }
            state.active.issued += 1;
            (state.active.issued, state.active.cursor.clone())
        };

        let mut spec = QuerySpec::collection(E::COLLECTION)
            .order_by_desc(FIELD_DATE_CREATED)
            .limit(page_size);
        if let Some(cursor) = start_after {
            spec = spec.start_after(cursor);
        }

        let docs = match self.store.query(spec).await {
            Ok(docs) => docs,
            Err(err) => return Err(self.fail("fetch_many", &err)),
        };

        let next_cursor = docs.last().map(|doc| doc.cursor_for(FIELD_DATE_CREATED));
        let mut page = Vec::with_capacity(docs.len());
        for doc in &docs {
            let record = match Self::decode(doc) {
                Ok(record) => record,
                Err(err) => return Err(self.fail_domain(err)),
            };
            if E::SOFT_DELETE && record.is_deleted() {
                continue;
            }
            page.push(record);
        }

        let mut state = self.lock();
        state.is_loading = false;
        if state.active.issued != token {
            tracing::debug!(collection = E::COLLECTION, "stale page discarded");
            drop(state);
            return Ok(page);
        }
        if let Some(cursor) = next_cursor {
            state.active.cursor = Some(cursor);
        }
        state.active.records.extend(page.iter().cloned());
        drop(state);
        Ok(page)
    }

    /// Full-collection scan matching `term` against the entity's
    /// searchable fields.
    ///
    /// With `include_deleted`, results are partitioned and **both** caches
    /// are replaced with the partition — search is a full replacement, not
    /// a merge. Without it, deleted records are excluded from the results
    /// and from any state mutation.
    pub async fn search(
        &self,
        term: &SearchTerm,
        include_deleted: bool,
    ) -> Result<SearchResults<E>, Error> {
        let (active_token, deleted_token) = {
            let mut state = self.lock();
            state.is_loading = true;
            state.last_error = None;
            state.active.issued += 1;
            if include_deleted {
                state.deleted.issued += 1;
            }
            (state.active.issued, state.deleted.issued)
        };

        let spec = QuerySpec::collection(E::COLLECTION).order_by_desc(FIELD_DATE_CREATED);
        let docs = match self.store.query(spec).await {
            Ok(docs) => docs,
            Err(err) => return Err(self.fail("search", &err)),
        };

        let mut active = Vec::new();
        let mut deleted = Vec::new();
        for doc in &docs {
            let record = match Self::decode(doc) {
                Ok(record) => record,
                Err(err) => return Err(self.fail_domain(err)),
            };
            if !record.matches(term) {
                continue;
            }
            if record.is_deleted() {
                deleted.push(record);
            } else {
                active.push(record);
            }
        }

        let results = if include_deleted {
            SearchResults { active, deleted }
        } else {
            SearchResults {
                active,
                deleted: Vec::new(),
            }
        };

        let mut state = self.lock();
        state.is_loading = false;
        let stale = state.active.issued != active_token
            || (include_deleted && state.deleted.issued != deleted_token);
        if stale {
            tracing::debug!(collection = E::COLLECTION, "stale search discarded");
            drop(state);
            return Ok(results);
        }
        state.active.records = results.active.clone();
        if include_deleted {
            state.deleted.records = results.deleted.clone();
        }
        drop(state);
        Ok(results)
    }

    /// Merge `patch` onto the remote record and bump `date_updated`.
    ///
    /// Cache placement follows the patch's soft-delete flag: setting it
    /// moves the record between the active and deleted lists, omitting it
    /// updates the record in place in whichever cache(s) currently hold it
    /// — both, if present in both, without assuming exclusivity.
    pub async fn update(&self, id: &RecordId, patch: Patch) -> Result<E, Error> {
        self.begin();
        let flag = patch.deleted_flag();
        let fields = patch
            .into_write_fields()
            .with_server_timestamp(FIELD_DATE_UPDATED);

        match self.store.update(E::COLLECTION, id, fields).await {
            Ok(doc) => {
                let updated = match Self::decode(&doc) {
                    Ok(updated) => updated,
                    Err(err) => return Err(self.fail_domain(err)),
                };
                let mut state = self.lock();
                match flag {
                    Some(true) => {
                        remove_by_id(&mut state.active.records, id);
                        upsert_front(&mut state.deleted.records, updated.clone());
                    }
                    Some(false) => {
                        remove_by_id(&mut state.deleted.records, id);
                        upsert_front(&mut state.active.records, updated.clone());
                    }
                    None => {
                        replace_in_place(&mut state.active.records, &updated);
                        replace_in_place(&mut state.deleted.records, &updated);
                    }
                }
                if state.current.as_ref().is_some_and(|rec| rec.id() == id) {
                    state.current = Some(updated.clone());
                }
                state.is_loading = false;
                drop(state);
                Ok(updated)
            }
            Err(err) => Err(self.fail("update", &err)),
        }
    }

    /// Permanently destroy the record remotely and purge every cache.
    pub async fn hard_delete(&self, id: &RecordId) -> Result<(), Error> {
        self.begin();
        match self.store.delete(E::COLLECTION, id).await {
            Ok(()) => {
                let mut state = self.lock();
                remove_by_id(&mut state.active.records, id);
                remove_by_id(&mut state.deleted.records, id);
                if state.current.as_ref().is_some_and(|rec| rec.id() == id) {
                    state.current = None;
                }
                state.is_loading = false;
                drop(state);
                Ok(())
            }
            Err(err) => Err(self.fail("hard_delete", &err)),
        }
    }

    fn creation_fields(&self, draft: &E) -> Result<WriteFields, Error> {
        let Value::Object(mut object) = serde_json::to_value(draft)
            .map_err(|err| Error::internal(format!("{} draft not serialisable: {err}", E::LABEL)))?
        else {
            return Err(Error::internal(format!(
                "{} draft did not serialise to a document",
                E::LABEL
            )));
        };
        // Audit fields are repository-owned; drafts never supply them.
        object.remove(FIELD_CREATED_BY);
        object.remove(FIELD_DATE_CREATED);
        object.remove(FIELD_DATE_UPDATED);

        let created_by = match self.session.snapshot() {
            Some(actor) => serde_json::to_value(CreatedBy::from(&actor))
                .map_err(|err| Error::internal(format!("created_by not serialisable: {err}")))?,
            None => Value::Null,
        };

        Ok(WriteFields::from_object(object)
            .with_json(FIELD_CREATED_BY, created_by)
            .with_server_timestamp(FIELD_DATE_CREATED)
            .with_server_timestamp(FIELD_DATE_UPDATED))
    }

    fn decode(doc: &Document) -> Result<E, Error> {
        let mut record: E = doc.decode().map_err(|err| {
            tracing::error!(
                collection = E::COLLECTION,
                id = %doc.id(),
                error = %err,
                "malformed document"
            );
            Error::internal(format!("malformed {} document: {err}", E::LABEL))
        })?;
        record.set_id(doc.id().clone());
        Ok(record)
    }

    fn begin(&self) {
        let mut state = self.lock();
        state.is_loading = true;
        state.last_error = None;
    }

    fn fail(&self, operation: &str, error: &StoreError) -> Error {
        tracing::warn!(
            collection = E::COLLECTION,
            operation,
            error = %error,
            "store operation failed"
        );
        let mapped = match error {
            StoreError::NotFound { .. } => Error::not_found(messages::not_found(E::LABEL)),
            StoreError::Unavailable { .. } | StoreError::Query { .. } => {
                Error::unavailable(messages::operation_failed(E::LABEL))
            }
        };
        self.fail_domain(mapped)
    }

    fn fail_domain(&self, error: Error) -> Error {
        let mut state = self.lock();
        state.last_error = Some(error.message().to_owned());
        state.is_loading = false;
        drop(state);
        error
    }

    fn lock(&self) -> MutexGuard<'_, RepoState<E>> {
        // Held only across synchronous cache mutation, never an await.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<E: SoftDeletable> Repository<E> {
    /// Fetch the next page of soft-deleted records.
    ///
    /// Ordered by deletion time descending, falling back to the update
    /// time for records whose deletion time is absent. Uses its own
    /// cursor, independent of [`Repository::fetch_many`].
    pub async fn fetch_deleted(&self, page_size: usize, reset: bool) -> Result<Vec<E>, Error> {
        let (token, start_after) = {
            let mut state = self.lock();
            state.is_loading = true;
            state.last_error = None;
            if reset {
                state.deleted.records.clear();
                state.deleted.cursor = None;
            }
            state.deleted.issued += 1;
            (state.deleted.issued, state.deleted.cursor.clone())
        };

        let mut spec = QuerySpec::collection(E::COLLECTION)
            .order_by_desc(FIELD_DATE_DELETED)
            .limit(page_size);
        if let Some(cursor) = start_after {
            spec = spec.start_after(cursor);
        }

        let docs = match self.store.query(spec).await {
            Ok(docs) => docs,
            Err(err) => return Err(self.fail("fetch_deleted", &err)),
        };

        let next_cursor = docs.last().map(|doc| doc.cursor_for(FIELD_DATE_DELETED));
        let mut page = Vec::with_capacity(docs.len());
        for doc in &docs {
            let record = match Self::decode(doc) {
                Ok(record) => record,
                Err(err) => return Err(self.fail_domain(err)),
            };
            if record.is_deleted() {
                page.push(record);
            }
        }
        page.sort_by_key(|record| std::cmp::Reverse(deletion_sort_key(record)));

        let mut state = self.lock();
        state.is_loading = false;
        if state.deleted.issued != token {
            tracing::debug!(collection = E::COLLECTION, "stale page discarded");
            drop(state);
            return Ok(page);
        }
        if let Some(cursor) = next_cursor {
            state.deleted.cursor = Some(cursor);
        }
        state.deleted.records.extend(page.iter().cloned());
        drop(state);
        Ok(page)
    }

    /// Mark the record deleted without destroying it.
    ///
    /// The cached record object is moved from the active list into the
    /// deleted list — read from the cache, not re-fetched — with a
    /// local-clock deletion time as an optimistic placeholder until the
    /// next fetch replaces it with the server value. When the id is not in
    /// the active cache nothing is inserted into the deleted cache.
    pub async fn soft_delete(&self, id: &RecordId) -> Result<(), Error> {
        self.begin();
        let fields = WriteFields::new()
            .with_json(FIELD_IS_DELETED, json!(true))
            .with_server_timestamp(FIELD_DATE_DELETED)
            .with_server_timestamp(FIELD_DATE_UPDATED);

        match self.store.update(E::COLLECTION, id, fields).await {
            Ok(_) => {
                let mut state = self.lock();
                if let Some(mut record) = remove_by_id(&mut state.active.records, id) {
                    record.set_deleted(true, Some(Utc::now()));
                    state.deleted.records.insert(0, record);
                }
                state.is_loading = false;
                drop(state);
                Ok(())
            }
            Err(err) => Err(self.fail("soft_delete", &err)),
        }
    }

    /// Undo a soft delete.
    ///
    /// Clears the remote flag and deletion time and moves the cached
    /// object back to the active list. A no-op returning success when the
    /// id is not in the deleted cache.
    pub async fn restore(&self, id: &RecordId) -> Result<(), Error> {
        self.begin();
        let fields = WriteFields::new()
            .with_json(FIELD_IS_DELETED, json!(false))
            .with_json(FIELD_DATE_DELETED, Value::Null)
            .with_server_timestamp(FIELD_DATE_UPDATED);

        match self.store.update(E::COLLECTION, id, fields).await {
            Ok(_) => {
                let mut state = self.lock();
                if let Some(mut record) = remove_by_id(&mut state.deleted.records, id) {
                    record.set_deleted(false, None);
                    state.active.records.insert(0, record);
                }
                state.is_loading = false;
                drop(state);
                Ok(())
            }
            Err(err) => Err(self.fail("restore", &err)),
        }
    }
}

fn deletion_sort_key<E: SoftDeletable>(record: &E) -> DateTime<Utc> {
    record
        .date_deleted()
        .or(record.audit().date_updated)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn position_of<E: Entity>(records: &[E], id: &RecordId) -> Option<usize> {
    records.iter().position(|record| record.id() == id)
}

fn remove_by_id<E: Entity>(records: &mut Vec<E>, id: &RecordId) -> Option<E> {
    position_of(records, id).map(|pos| records.remove(pos))
}

fn upsert_front<E: Entity>(records: &mut Vec<E>, record: E) {
    match position_of(records, record.id()) {
        Some(pos) => {
            if let Some(slot) = records.get_mut(pos) {
                *slot = record;
            }
        }
        None => records.insert(0, record),
    }
}

fn replace_in_place<E: Entity>(records: &mut [E], record: &E) {
    for slot in records
        .iter_mut()
        .filter(|candidate| candidate.id() == record.id())
    {
        *slot = record.clone();
    }
}

/// Repository over [`crate::domain::entities::Client`].
pub type ClientRepository = Repository<super::entities::Client>;
/// Repository over [`crate::domain::entities::StaffUser`].
pub type StaffUserRepository = Repository<super::entities::StaffUser>;
/// Repository over [`crate::domain::entities::Agency`].
pub type AgencyRepository = Repository<super::entities::Agency>;
/// Repository over [`crate::domain::entities::Hotel`].
pub type HotelRepository = Repository<super::entities::Hotel>;
/// Repository over [`crate::domain::entities::Flight`].
pub type FlightRepository = Repository<super::entities::Flight>;
/// Repository over [`crate::domain::entities::TravelPackage`].
pub type TravelPackageRepository = Repository<super::entities::TravelPackage>;
/// Repository over [`crate::domain::entities::TravelService`].
pub type TravelServiceRepository = Repository<super::entities::TravelService>;
