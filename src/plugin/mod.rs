//! Storage plugin seam.
//!
//! A storage plugin implements [`StoragePlugin`] against the server endpoints;
//! the host drives it through [`PluginClient`], which stands in for the plugin
//! process boundary by handing each call a connected stream pair.

pub mod client;
pub mod loopback;

pub use client::PluginClient;
pub use loopback::LoopbackStorage;

use crate::error::Status;
use crate::streaming::{GetObjectRequest, GetObjectServer, PutObjectServer};
use async_trait::async_trait;
use bytes::Bytes;

/// Object streaming calls a storage backend serves.
#[async_trait]
pub trait StoragePlugin: Send + Sync + 'static {
    /// Stream the requested object to the host with `stream.send`.
    ///
    /// Return `Ok` once every chunk is sent; the stream is then finished. An
    /// `Err` is delivered to the host as the stream's terminal error.
    async fn get_object(
        &self,
        request: GetObjectRequest,
        stream: &GetObjectServer,
    ) -> Result<(), Status>;

    /// Read the upload from `stream.recv` and answer with `send_and_close`.
    ///
    /// An `Err` is delivered to the host as the upload's terminal error.
    /// Returning `Ok` without answering leaves the host with no result.
    async fn put_object(&self, stream: &PutObjectServer) -> Result<(), Status>;
}

/// Zero-copy slices of `data`, each at most `chunk_size` bytes.
pub(crate) fn chunks(data: &Bytes, chunk_size: usize) -> impl Iterator<Item = Bytes> + '_ {
    debug_assert!(chunk_size > 0);
    (0..data.len())
        .step_by(chunk_size)
        .map(move |start| data.slice(start..data.len().min(start + chunk_size)))
}
