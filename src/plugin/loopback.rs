//! In-memory storage plugin.
//!
//! Keeps objects in process memory so the host's recording upload and
//! download paths can run end to end without a real storage backend.

use crate::config::LoopbackConfig;
use crate::error::Status;
use crate::plugin::{chunks, StoragePlugin};
use crate::streaming::{
    GetObjectRequest, GetObjectResponse, GetObjectServer, ObjectKey, PutObjectRequest,
    PutObjectResponse, PutObjectServer,
};
use anyhow::Result;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use std::collections::HashMap;
use tokio::sync::RwLock;

type Bucket = HashMap<String, Bytes>;

/// Storage backend holding every object in memory.
#[derive(Debug)]
pub struct LoopbackStorage {
    config: LoopbackConfig,
    buckets: RwLock<HashMap<String, Bucket>>,
}

impl LoopbackStorage {
    pub fn new(config: LoopbackConfig) -> Result<Self> {
        config.validate()?;
        let buckets = config
            .buckets
            .iter()
            .map(|name| (name.clone(), Bucket::new()))
            .collect();
        Ok(Self {
            config,
            buckets: RwLock::new(buckets),
        })
    }

    pub fn config(&self) -> &LoopbackConfig {
        &self.config
    }

    /// Store an object directly, creating its bucket if needed.
    pub async fn insert_object(&self, object: ObjectKey, data: impl Into<Bytes>) {
        self.buckets
            .write()
            .await
            .entry(object.bucket)
            .or_default()
            .insert(object.key, data.into());
    }

    pub async fn object(&self, object: &ObjectKey) -> Option<Bytes> {
        self.buckets
            .read()
            .await
            .get(&object.bucket)
            .and_then(|bucket| bucket.get(&object.key))
            .cloned()
    }

    /// Bucket names, sorted.
    pub async fn bucket_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.buckets.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    async fn lookup(&self, object: &ObjectKey) -> Result<Bytes, Status> {
        let buckets = self.buckets.read().await;
        let bucket = buckets
            .get(&object.bucket)
            .ok_or_else(|| Status::not_found(format!("bucket {} does not exist", object.bucket)))?;
        bucket
            .get(&object.key)
            .cloned()
            .ok_or_else(|| Status::not_found(format!("object {} does not exist", object)))
    }

    async fn ensure_bucket(&self, object: &ObjectKey) -> Result<(), Status> {
        if self.config.create_buckets || self.buckets.read().await.contains_key(&object.bucket) {
            return Ok(());
        }
        Err(Status::not_found(format!(
            "bucket {} does not exist",
            object.bucket
        )))
    }
}

fn checksum(data: &[u8]) -> String {
    hex::encode(blake3::hash(data).as_bytes())
}

#[async_trait]
impl StoragePlugin for LoopbackStorage {
    async fn get_object(
        &self,
        request: GetObjectRequest,
        stream: &GetObjectServer,
    ) -> Result<(), Status> {
        let data = self.lookup(&request.object).await?;

        for chunk in chunks(&data, self.config.chunk_size) {
            stream.send(GetObjectResponse::new(chunk)).await?;
        }
        Ok(())
    }

    async fn put_object(&self, stream: &PutObjectServer) -> Result<(), Status> {
        let object = match stream.recv().await {
            Some(PutObjectRequest::Metadata(object)) => object,
            Some(PutObjectRequest::Chunk(_)) => {
                return Err(Status::invalid_argument(
                    "first PutObject message must name the object",
                ))
            }
            None => {
                return Err(Status::invalid_argument(
                    "PutObject stream ended before the object was named",
                ))
            }
        };
        self.ensure_bucket(&object).await?;

        let mut data = BytesMut::new();
        while let Some(request) = stream.recv().await {
            match request {
                PutObjectRequest::Chunk(chunk) => data.extend_from_slice(&chunk),
                PutObjectRequest::Metadata(other) => {
                    return Err(Status::invalid_argument(format!(
                        "object already named {}, got {}",
                        object, other
                    )))
                }
            }
        }

        let data = data.freeze();
        let response = PutObjectResponse {
            checksum: checksum(&data),
            size: data.len() as u64,
        };
        tracing::debug!(%object, size = response.size, "stored object");
        self.insert_object(object, data).await;

        stream.send_and_close(response).await?;
        Ok(())
    }
}
