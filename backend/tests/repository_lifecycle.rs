//! End-to-end lifecycle coverage for the entity repositories.
//!
//! These tests wire real repositories to the in-process adapters and walk
//! the listing, soft-delete and search flows the back-office screens
//! perform, asserting the cache invariants the screens rely on.

use std::sync::Arc;

use serde_json::json;

use backoffice::domain::document::{FIELD_IS_DELETED, Patch};
use backoffice::domain::entities::{Client, ClientStatus, Hotel, StaffUser};
use backoffice::domain::entity::{Entity, SearchTerm, SoftDeletable};
use backoffice::domain::{Repository, SessionContext};
use backoffice::outbound::memory::{InMemoryAuthProvider, InMemoryDocumentStore};

fn session(store: &Arc<InMemoryDocumentStore>) -> (Arc<InMemoryDocumentStore>, Arc<SessionContext>) {
    (
        store.clone(),
        Arc::new(SessionContext::new(Arc::new(InMemoryAuthProvider::new()))),
    )
}

fn client_repo(store: &Arc<InMemoryDocumentStore>) -> Repository<Client> {
    let (store, session) = session(store);
    Repository::new(store, session)
}

#[tokio::test]
async fn intake_soft_delete_and_restore_walkthrough() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let clients = client_repo(&store);

    // Intake form submits a name and a phone number.
    let mut draft = Client::new("Ahmed");
    draft.tel = Some("0600000000".to_owned());
    let stored = clients.create(draft).await.expect("create");
    assert_eq!(stored.status, ClientStatus::Active, "status defaults to active");
    assert!(stored.id.is_assigned());

    // The detail screen fetches exactly what was stored.
    let fetched = clients.fetch_one(&stored.id).await.expect("fetch");
    assert_eq!(fetched, stored);

    // Soft delete moves the record into the recycle-bin view.
    clients.soft_delete(&stored.id).await.expect("soft delete");
    assert!(clients.records().is_empty());
    assert_eq!(clients.deleted_records().len(), 1);
    let remote = clients.fetch_one(&stored.id).await.expect("fetch");
    assert!(remote.is_deleted());
    assert!(remote.date_deleted().is_some());

    // Restore brings it back with the tombstone cleared.
    clients.restore(&stored.id).await.expect("restore");
    assert!(clients.deleted_records().is_empty());
    let restored = clients.fetch_one(&stored.id).await.expect("fetch");
    assert!(!restored.is_deleted());
    assert!(restored.date_deleted().is_none());
    assert_eq!(restored.name, "Ahmed");
    assert_eq!(restored.tel.as_deref(), Some("0600000000"));
}

#[tokio::test]
async fn a_record_is_cached_as_active_or_deleted_never_both() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let clients = client_repo(&store);

    let a = clients.create(Client::new("A")).await.expect("create");
    let b = clients.create(Client::new("B")).await.expect("create");
    clients.soft_delete(&a.id).await.expect("soft delete");

    let active: Vec<_> = clients.records().into_iter().map(|c| c.id).collect();
    let deleted: Vec<_> = clients.deleted_records().into_iter().map(|c| c.id).collect();
    assert!(active.contains(&b.id) && !active.contains(&a.id));
    assert!(deleted.contains(&a.id) && !deleted.contains(&b.id));

    clients.restore(&a.id).await.expect("restore");
    let active: Vec<_> = clients.records().into_iter().map(|c| c.id).collect();
    let deleted: Vec<_> = clients.deleted_records().into_iter().map(|c| c.id).collect();
    assert!(active.contains(&a.id));
    assert!(deleted.is_empty());
}

#[tokio::test]
async fn restore_twice_succeeds_and_changes_nothing_further() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let clients = client_repo(&store);
    let stored = clients.create(Client::new("Ahmed")).await.expect("create");
    clients.soft_delete(&stored.id).await.expect("soft delete");

    clients.restore(&stored.id).await.expect("first restore");
    clients.restore(&stored.id).await.expect("second restore");

    assert_eq!(clients.records().len(), 1);
    assert!(clients.deleted_records().is_empty());
    let remote = clients.fetch_one(&stored.id).await.expect("fetch");
    assert!(!remote.is_deleted());
}

#[tokio::test]
async fn patch_driven_delete_matches_the_dedicated_soft_delete() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let clients = client_repo(&store);
    let via_patch = clients.create(Client::new("Patched")).await.expect("create");
    let via_call = clients.create(Client::new("Called")).await.expect("create");

    clients
        .update(&via_patch.id, Patch::new().with(FIELD_IS_DELETED, json!(true)))
        .await
        .expect("update");
    clients.soft_delete(&via_call.id).await.expect("soft delete");

    let deleted: Vec<_> = clients.deleted_records().into_iter().map(|c| c.id).collect();
    assert!(deleted.contains(&via_patch.id));
    assert!(deleted.contains(&via_call.id));
    assert!(clients.records().is_empty());
    for id in [&via_patch.id, &via_call.id] {
        let remote = clients.fetch_one(id).await.expect("fetch");
        assert!(remote.is_deleted());
    }
}

#[tokio::test]
async fn listing_pages_are_disjoint_and_newest_first() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let seeder = client_repo(&store);
    for index in 0..7 {
        seeder
            .create(Client::new(format!("client-{index}")))
            .await
            .expect("create");
    }

    let pager = client_repo(&store);
    let mut pages = Vec::new();
    pages.push(pager.fetch_many(3, true).await.expect("page"));
    pages.push(pager.fetch_many(3, false).await.expect("page"));
    pages.push(pager.fetch_many(3, false).await.expect("page"));

    assert_eq!(pages[0].len(), 3);
    assert_eq!(pages[1].len(), 3);
    assert_eq!(pages[2].len(), 1);
    // Newest creation first within the flattened listing.
    let names: Vec<String> = pages.iter().flatten().map(|c| c.name.clone()).collect();
    assert_eq!(names.first().map(String::as_str), Some("client-6"));
    assert_eq!(names.last().map(String::as_str), Some("client-0"));
    let mut ids: Vec<String> = pages
        .iter()
        .flatten()
        .map(|c| c.id.as_str().to_owned())
        .collect();
    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), total, "no record appears on two pages");
    assert_eq!(pager.records().len(), 7);
}

#[tokio::test]
async fn search_partitions_matches_by_tombstone_state() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let users = {
        let (store, session) = session(&store);
        Repository::<StaffUser>::new(store, session)
    };

    let active = users.create(StaffUser::new("Yasmina")).await.expect("create");
    let retired = users.create(StaffUser::new("Yasser")).await.expect("create");
    users.create(StaffUser::new("Omar")).await.expect("create");
    users.soft_delete(&retired.id).await.expect("soft delete");

    let term = SearchTerm::new("yas").expect("non-empty");
    let results = users.search(&term, true).await.expect("search");

    assert_eq!(
        results.active.iter().map(|u| u.id.clone()).collect::<Vec<_>>(),
        vec![active.id]
    );
    assert_eq!(
        results.deleted.iter().map(|u| u.id.clone()).collect::<Vec<_>>(),
        vec![retired.id]
    );
    assert_eq!(users.records(), results.active);
    assert_eq!(users.deleted_records(), results.deleted);
}

#[tokio::test]
async fn catalogue_collections_support_the_same_listing_surface() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let hotels = {
        let (store, session) = session(&store);
        Repository::<Hotel>::new(store, session)
    };

    let mut draft = Hotel::new("Riad Atlas");
    draft.city = Some("Marrakesh".to_owned());
    draft.stars = Some(4);
    let stored = hotels.create(draft).await.expect("create");

    let listed = hotels.fetch_many(10, true).await.expect("page");
    assert_eq!(listed.len(), 1);

    let term = SearchTerm::new("MARRAKESH").expect("non-empty");
    let results = hotels.search(&term, false).await.expect("search");
    assert_eq!(results.active.len(), 1);

    hotels.hard_delete(&stored.id).await.expect("hard delete");
    assert!(hotels.records().is_empty());
    assert!(store.is_empty(Hotel::COLLECTION));
}
