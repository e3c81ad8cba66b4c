//! Profile image handling over the object storage port.
//!
//! The only blob-store consumer in the system: operator profile images,
//! addressed by a per-user key so a re-upload replaces the previous image.

use std::sync::Arc;

use super::error::Error;
use super::messages;
use super::ports::ObjectStorage;

/// Uploads and removes operator profile images.
pub struct ProfileImageService {
    storage: Arc<dyn ObjectStorage>,
}

impl ProfileImageService {
    /// Wire the service to its blob store.
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    /// The storage key owned by the given actor uid.
    pub fn key_for(uid: &str) -> String {
        format!("avatars/{uid}")
    }

    /// Store the image bytes, returning the key to persist on the user
    /// record.
    pub async fn upload(&self, uid: &str, bytes: Vec<u8>) -> Result<String, Error> {
        let key = Self::key_for(uid);
        self.storage.put(&key, bytes).await.map_err(|err| {
            tracing::warn!(key = %key, error = %err, "profile image upload failed");
            Error::unavailable(messages::profile_image_failed())
        })?;
        Ok(key)
    }

    /// Remove the actor's image, if one exists.
    pub async fn remove(&self, uid: &str) -> Result<(), Error> {
        let key = Self::key_for(uid);
        self.storage.delete(&key).await.map_err(|err| {
            tracing::warn!(key = %key, error = %err, "profile image removal failed");
            Error::unavailable(messages::profile_image_failed())
        })
    }
}
