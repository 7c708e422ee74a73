//! Host-side handle to a storage plugin.
//!
//! Each call builds a fresh stream, runs the plugin handler on its own task
//! with the server endpoint, and hands the client endpoint back to the caller.

use crate::error::{StreamError, TransferError};
use crate::plugin::{chunks, StoragePlugin};
use crate::streaming::{
    GetObjectClient, GetObjectRequest, GetObjectStream, ObjectKey, PutObjectClient,
    PutObjectRequest, PutObjectResponse, PutObjectStream,
};
use bytes::{Bytes, BytesMut};
use std::iter;
use std::sync::Arc;

/// Connection to a storage plugin. Cheap to clone.
pub struct PluginClient<P> {
    plugin: Arc<P>,
}

impl<P> Clone for PluginClient<P> {
    fn clone(&self) -> Self {
        Self {
            plugin: Arc::clone(&self.plugin),
        }
    }
}

impl<P: StoragePlugin> PluginClient<P> {
    pub fn new(plugin: P) -> Self {
        Self::from_arc(Arc::new(plugin))
    }

    pub fn from_arc(plugin: Arc<P>) -> Self {
        Self { plugin }
    }

    pub fn plugin(&self) -> &Arc<P> {
        &self.plugin
    }

    /// Start a download. Must be called within a tokio runtime.
    pub fn get_object(&self, request: GetObjectRequest) -> GetObjectClient {
        let (client, server) = GetObjectStream::new().split();
        let plugin = Arc::clone(&self.plugin);

        tokio::spawn(async move {
            let object = request.object.clone();
            tracing::debug!(%object, "GetObject started");

            match plugin.get_object(request, &server).await {
                Ok(()) => {
                    if server.finish().is_err() {
                        tracing::debug!(%object, "GetObject closed by host before completion");
                    } else {
                        tracing::debug!(%object, "GetObject finished");
                    }
                }
                Err(status) => {
                    tracing::debug!(%object, %status, "GetObject failed");
                    if server.send_error(status).await.is_err() {
                        tracing::debug!(%object, "GetObject error not delivered, stream already closed");
                    }
                }
            }
        });

        client
    }

    /// Start an upload. Must be called within a tokio runtime.
    pub fn put_object(&self) -> PutObjectClient {
        let (client, server) = PutObjectStream::new().split();
        let plugin = Arc::clone(&self.plugin);

        tokio::spawn(async move {
            match plugin.put_object(&server).await {
                Ok(()) => {
                    if server.close() {
                        tracing::warn!("PutObject handler returned without a result");
                    }
                }
                Err(status) => {
                    tracing::debug!(%status, "PutObject failed");
                    if server.send_error(status).await.is_err() {
                        tracing::debug!("PutObject error not delivered, stream already closed");
                    }
                }
            }
        });

        client
    }

    /// Download a whole object.
    pub async fn download(&self, request: GetObjectRequest) -> Result<Bytes, TransferError> {
        let client = self.get_object(request);
        let mut data = BytesMut::new();
        while let Some(response) = client.recv().await? {
            data.extend_from_slice(&response.file_chunk);
        }
        Ok(data.freeze())
    }

    /// Upload `data` as `object`, sent in chunks of at most `chunk_size` bytes.
    pub async fn upload(
        &self,
        object: ObjectKey,
        data: Bytes,
        chunk_size: usize,
    ) -> Result<PutObjectResponse, TransferError> {
        if chunk_size == 0 {
            return Err(StreamError::InvalidArgument("chunk size must be non-zero").into());
        }

        let client = self.put_object();
        let requests = iter::once(PutObjectRequest::Metadata(object))
            .chain(chunks(&data, chunk_size).map(PutObjectRequest::Chunk));

        for request in requests {
            match client.send(request).await {
                Ok(()) => {}
                // The plugin stopped reading; its answer says why.
                Err(StreamError::AlreadyClosed) => break,
                Err(err) => return Err(err.into()),
            }
        }

        match client.close_and_recv().await? {
            Some(response) => Ok(response),
            None => Err(TransferError::UnexpectedEof),
        }
    }
}
