//! Blob store: where uploads are staged before recognition.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use scribe_core::{ObjectName, StoredObject};
use tracing::{debug, instrument};

use crate::auth::TokenSource;
use crate::errors::{StoreError, upstream_message};

/// Durable object storage with a create-object operation.
///
/// Objects are written private: implementations never grant public read.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Bucket new objects land in.
    fn bucket(&self) -> &str;

    /// Write `body` under `name` with `content_type` metadata.
    async fn put(
        &self,
        name: &ObjectName,
        body: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, StoreError>;
}

/// Google Cloud Storage via the JSON API simple-upload endpoint.
///
/// No `predefinedAcl` is sent, so objects inherit the bucket's private
/// default.
pub struct GcsBlobStore {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    tokens: Arc<dyn TokenSource>,
}

impl std::fmt::Debug for GcsBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcsBlobStore")
            .field("base_url", &self.base_url)
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

impl GcsBlobStore {
    /// Build a store for `bucket` at `base_url` (normally
    /// `https://storage.googleapis.com`).
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        bucket: impl Into<String>,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            tokens,
        }
    }

    fn upload_url(&self) -> String {
        format!("{}/upload/storage/v1/b/{}/o", self.base_url, self.bucket)
    }
}

#[async_trait]
impl BlobStore for GcsBlobStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    #[instrument(skip_all, fields(bucket = %self.bucket, object = %name))]
    async fn put(
        &self,
        name: &ObjectName,
        body: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, StoreError> {
        let token = self.tokens.access_token().await?;
        let size = body.len() as u64;

        let response = self
            .client
            .post(self.upload_url())
            .query(&[("uploadType", "media"), ("name", name.as_str())])
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Upstream {
                status: status.as_u16(),
                message: upstream_message(status, &body),
            });
        }

        debug!(size, "object written");
        Ok(StoredObject {
            bucket: self.bucket.clone(),
            name: name.clone(),
            content_type: content_type.to_string(),
            size,
        })
    }
}
