//! In-memory document store adapter.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::document::{Document, RecordId, StoreTimestamp, WriteFields, WriteValue};
use crate::domain::ports::{Direction, DocumentStore, QuerySpec, StoreError};

#[derive(Debug, Clone)]
struct StoredDoc {
    id: String,
    // Monotonic insertion sequence; breaks order-key ties deterministically.
    seq: u64,
    fields: Map<String, Value>,
}

impl StoredDoc {
    fn to_document(&self) -> Document {
        Document::new(RecordId::new(self.id.clone()), self.fields.clone())
    }
}

/// Document store holding collections in process memory.
///
/// Identities are uuid-v4 strings; server-timestamp sentinels resolve
/// against the adapter clock at write time, so the timestamps a caller
/// reads back are authoritative in the same way the hosted store's are.
///
/// # Examples
/// ```
/// use backoffice::domain::document::WriteFields;
/// use backoffice::domain::ports::DocumentStore;
/// use backoffice::outbound::memory::InMemoryDocumentStore;
/// use serde_json::json;
///
/// # async fn demo() -> Result<(), backoffice::domain::ports::StoreError> {
/// let store = InMemoryDocumentStore::new();
/// let doc = store
///     .add("clients", WriteFields::new().with_json("clients_name", json!("Ahmed")))
///     .await?;
/// assert!(doc.id().is_assigned());
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: Mutex<HashMap<String, Vec<StoredDoc>>>,
    seq: AtomicU64,
    fail_next: Mutex<Option<StoreError>>,
}

impl InMemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next operation fail with the given error.
    ///
    /// Used by tests to exercise the repository failure paths.
    pub fn fail_next(&self, error: StoreError) {
        *lock(&self.fail_next) = Some(error);
    }

    /// Number of documents currently held in a collection.
    pub fn len(&self, collection: &str) -> usize {
        lock(&self.collections)
            .get(collection)
            .map_or(0, Vec::len)
    }

    /// Whether a collection holds no documents.
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn take_injected_failure(&self) -> Option<StoreError> {
        lock(&self.fail_next).take()
    }

    fn resolve(fields: WriteFields) -> Map<String, Value> {
        let now = StoreTimestamp::from_datetime(Utc::now());
        fields
            .into_iter()
            .map(|(name, value)| match value {
                WriteValue::Json(value) => (name, value),
                WriteValue::ServerTimestamp => (name, now.to_value()),
            })
            .collect()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// Total order over JSON values used for order-by and cursor comparison.
// Null and missing sort lowest; provider timestamp objects compare by
// instant; everything else falls back to its text form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Missing,
    Boolean(bool),
    Number(i128),
    Text(String),
}

fn sort_key(value: Option<&Value>) -> SortKey {
    match value {
        None | Some(Value::Null) => SortKey::Missing,
        Some(Value::Bool(flag)) => SortKey::Boolean(*flag),
        Some(Value::Number(number)) => {
            // Scale into fixed-point so fractional prices order correctly.
            let scaled = number.as_f64().unwrap_or(0.0) * 1_000_000.0;
            SortKey::Number(scaled as i128)
        }
        Some(value @ Value::Object(fields)) => {
            match serde_json::from_value::<StoreTimestamp>(value.clone()) {
                Ok(ts) => {
                    SortKey::Number(i128::from(ts.seconds) * 1_000_000_000 + i128::from(ts.nanos))
                }
                Err(_) => SortKey::Text(Value::Object(fields.clone()).to_string()),
            }
        }
        Some(Value::String(text)) => SortKey::Text(text.clone()),
        Some(value @ Value::Array(_)) => SortKey::Text(value.to_string()),
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn add(&self, collection: &str, fields: WriteFields) -> Result<Document, StoreError> {
        if let Some(error) = self.take_injected_failure() {
            return Err(error);
        }
        let doc = StoredDoc {
            id: Uuid::new_v4().to_string(),
            seq: self.seq.fetch_add(1, Ordering::SeqCst),
            fields: Self::resolve(fields),
        };
        let document = doc.to_document();
        lock(&self.collections)
            .entry(collection.to_owned())
            .or_default()
            .push(doc);
        Ok(document)
    }

    async fn get(
        &self,
        collection: &str,
        id: &RecordId,
    ) -> Result<Option<Document>, StoreError> {
        if let Some(error) = self.take_injected_failure() {
            return Err(error);
        }
        let collections = lock(&self.collections);
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id.as_str()))
            .map(StoredDoc::to_document))
    }

    async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        fields: WriteFields,
    ) -> Result<Document, StoreError> {
        if let Some(error) = self.take_injected_failure() {
            return Err(error);
        }
        let resolved = Self::resolve(fields);
        let mut collections = lock(&self.collections);
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id.as_str()))
            .ok_or_else(|| StoreError::not_found(collection, id.as_str()))?;
        for (name, value) in resolved {
            doc.fields.insert(name, value);
        }
        Ok(doc.to_document())
    }

    async fn delete(&self, collection: &str, id: &RecordId) -> Result<(), StoreError> {
        if let Some(error) = self.take_injected_failure() {
            return Err(error);
        }
        let mut collections = lock(&self.collections);
        if let Some(docs) = collections.get_mut(collection) {
            docs.retain(|doc| doc.id != id.as_str());
        }
        Ok(())
    }

    async fn query(&self, spec: QuerySpec) -> Result<Vec<Document>, StoreError> {
        if let Some(error) = self.take_injected_failure() {
            return Err(error);
        }
        let collections = lock(&self.collections);
        let mut docs: Vec<StoredDoc> = collections
            .get(spec.collection_name())
            .cloned()
            .unwrap_or_default();
        drop(collections);

        for filter in spec.filters() {
            docs.retain(|doc| doc.fields.get(&filter.field) == Some(&filter.equals));
        }

        if let Some(order) = spec.order() {
            let field = order.field.clone();
            let descending = order.direction == Direction::Descending;
            docs.sort_by(|a, b| {
                let ordering = sort_key(a.fields.get(&field))
                    .cmp(&sort_key(b.fields.get(&field)))
                    .then(a.seq.cmp(&b.seq));
                if descending { ordering.reverse() } else { ordering }
            });
        }

        if let (Some(cursor), Some(order)) = (spec.cursor(), spec.order()) {
            let position = docs.iter().position(|doc| doc.id == cursor.record_id());
            match position {
                Some(pos) => {
                    docs.drain(..=pos);
                }
                None => {
                    // The anchor document is gone; resume by order key.
                    let anchor = sort_key(Some(cursor.order_key()));
                    let descending = order.direction == Direction::Descending;
                    docs.retain(|doc| {
                        let key = sort_key(doc.fields.get(&order.field));
                        if descending { key < anchor } else { key > anchor }
                    });
                }
            }
        }

        if let Some(limit) = spec.max_results() {
            docs.truncate(limit);
        }

        Ok(docs.iter().map(StoredDoc::to_document).collect())
    }
}
