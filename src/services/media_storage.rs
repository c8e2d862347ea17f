// src/services/media_storage.rs

//! Object-storage access for member-visible media (covers, attachments).
//! The bucket is an external collaborator; this module only proxies
//! uploads/deletes and derives public URLs.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;
use worker::Env;

use crate::utils::{PortalError, PortalResult};

const MEDIA_BUCKET_BINDING: &str = "PORTAL_MEDIA";

#[derive(Error, Debug)]
pub enum ObjectStoreError {
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Invalid object key: {0}")]
    InvalidKey(String),
    #[error("Underlying object store error: {0}")]
    Storage(String),
}

pub type ObjectStoreResult<T> = Result<T, ObjectStoreError>;

/// Seam over the bucket. Worker futures are not `Send`, so the trait stays
/// `?Send` on every target; tests substitute an in-memory implementation.
#[async_trait(?Send)]
pub trait ObjectStore {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> ObjectStoreResult<()>;

    async fn delete_object(&self, key: &str) -> ObjectStoreResult<()>;
}

/// Media storage backed by the worker's R2 bucket binding.
pub struct MediaStorageService {
    bucket: worker::Bucket,
    public_base_url: String,
}

impl MediaStorageService {
    pub fn new(env: &Env) -> PortalResult<Self> {
        let bucket = env
            .bucket(MEDIA_BUCKET_BINDING)
            .map_err(|e| PortalError::config_error(format!("Missing media bucket: {:?}", e)))?;
        let public_base_url = env
            .var("MEDIA_PUBLIC_BASE_URL")
            .map(|v| v.to_string())
            .map_err(|_| PortalError::config_error("Missing MEDIA_PUBLIC_BASE_URL"))?;

        Ok(Self {
            bucket,
            public_base_url,
        })
    }

    /// Uploads one media object and returns its `(key, public url)` pair.
    pub async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> PortalResult<(String, String)> {
        let key = object_key(filename)?;
        self.put_object(&key, bytes, content_type).await?;
        let url = self.public_url(&key);
        Ok((key, url))
    }

    pub async fn remove(&self, key: &str) -> PortalResult<()> {
        if key.trim().is_empty() {
            return Err(ObjectStoreError::InvalidKey("empty object key".to_string()).into());
        }
        self.delete_object(key).await?;
        Ok(())
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url.trim_end_matches('/'), key)
    }
}

#[async_trait(?Send)]
impl ObjectStore for MediaStorageService {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> ObjectStoreResult<()> {
        let metadata = worker::HttpMetadata {
            content_type: Some(content_type.to_string()),
            ..worker::HttpMetadata::default()
        };
        self.bucket
            .put(key, bytes)
            .http_metadata(metadata)
            .execute()
            .await
            .map_err(|e| ObjectStoreError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> ObjectStoreResult<()> {
        self.bucket
            .delete(key)
            .await
            .map_err(|e| ObjectStoreError::Storage(e.to_string()))
    }
}

/// Builds a collision-free object key, keeping the original extension so
/// served objects get a sensible content type from the CDN.
fn object_key(filename: &str) -> ObjectStoreResult<String> {
    let trimmed = filename.trim();
    if trimmed.is_empty() || trimmed.contains('/') || trimmed.contains("..") {
        return Err(ObjectStoreError::InvalidKey(format!(
            "unacceptable filename: {}",
            filename
        )));
    }

    let extension = trimmed.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("bin");
    Ok(format!("media/{}.{}", Uuid::new_v4(), extension))
}
