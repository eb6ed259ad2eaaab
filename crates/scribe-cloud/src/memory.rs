//! In-process blob store for tests and local wiring.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use scribe_core::{ObjectName, StoredObject};

use crate::errors::StoreError;
use crate::storage::BlobStore;

/// An object held by [`MemoryBlobStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryObject {
    /// Stored bytes.
    pub body: Bytes,
    /// Recorded media type.
    pub content_type: String,
}

/// `HashMap`-backed [`BlobStore`]. Can be told to reject every write.
#[derive(Debug)]
pub struct MemoryBlobStore {
    bucket: String,
    objects: Mutex<HashMap<ObjectName, MemoryObject>>,
    failure: Mutex<Option<String>>,
    attempts: Mutex<usize>,
}

impl MemoryBlobStore {
    /// Empty store for `bucket`.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Mutex::new(HashMap::new()),
            failure: Mutex::new(None),
            attempts: Mutex::new(0),
        }
    }

    /// Reject subsequent writes with `message` (`None` to accept again).
    pub fn fail_with(&self, message: Option<&str>) {
        *self.failure.lock() = message.map(str::to_string);
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    /// Whether nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.objects.lock().is_empty()
    }

    /// Number of `put` calls, successful or not.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }

    /// Look up an object.
    pub fn get(&self, name: &ObjectName) -> Option<MemoryObject> {
        self.objects.lock().get(name).cloned()
    }

    /// Names of all stored objects.
    pub fn names(&self) -> Vec<ObjectName> {
        self.objects.lock().keys().cloned().collect()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(
        &self,
        name: &ObjectName,
        body: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, StoreError> {
        *self.attempts.lock() += 1;
        if let Some(message) = self.failure.lock().clone() {
            return Err(StoreError::Upstream {
                status: 503,
                message,
            });
        }

        let size = body.len() as u64;
        let mut objects = self.objects.lock();
        if objects.contains_key(name) {
            return Err(StoreError::Upstream {
                status: 412,
                message: format!("object {name} already exists"),
            });
        }
        let _ = objects.insert(
            name.clone(),
            MemoryObject {
                body,
                content_type: content_type.to_string(),
            },
        );

        Ok(StoredObject {
            bucket: self.bucket.clone(),
            name: name.clone(),
            content_type: content_type.to_string(),
            size,
        })
    }
}
