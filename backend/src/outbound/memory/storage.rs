//! In-memory object storage adapter.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ports::{ObjectStorage, ObjectStorageError};

/// Byte-map blob store keyed by object path.
#[derive(Default)]
pub struct InMemoryObjectStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryObjectStorage {
    /// Create an empty blob store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes stored under a key, if any.
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().get(key).cloned()
    }

    /// Whether any object is stored under the key.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        match self.objects.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), ObjectStorageError> {
        self.lock().insert(key.to_owned(), bytes);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_replaces_and_delete_removes() {
        let storage = InMemoryObjectStorage::new();
        storage.put("avatars/u1", vec![1]).await.expect("put");
        storage.put("avatars/u1", vec![2]).await.expect("replace");
        assert_eq!(storage.object("avatars/u1"), Some(vec![2]));

        storage.delete("avatars/u1").await.expect("delete");
        assert!(!storage.contains("avatars/u1"));
    }
}
