//! Message types for the storage plugin object streams.
//!
//! GetObject: one request, then N `GetObjectResponse` chunks server -> client.
//! PutObject: N `PutObjectRequest` messages client -> server, then exactly one
//! `PutObjectResponse` (or error) server -> client.

use crate::error::Status;
use bytes::Bytes;
use std::fmt;

/// A message that can travel on an object stream.
///
/// An empty message is the absent payload: stream operations reject it with
/// `InvalidArgument` instead of sending it.
pub trait StreamMessage: Send + fmt::Debug + 'static {
    fn is_empty(&self) -> bool;
}

// =============================================================================
// Frame: payload or carried error
// =============================================================================

/// What a server endpoint pushes through the generic `send_msg` path: a typed
/// payload or a terminal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame<T> {
    Message(T),
    Error(Status),
}

impl<T> From<Status> for Frame<T> {
    fn from(status: Status) -> Self {
        Frame::Error(status)
    }
}

// =============================================================================
// Object addressing
// =============================================================================

/// Location of an object in the storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    pub bucket: String,
    pub key: String,
}

impl ObjectKey {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

// =============================================================================
// GetObject
// =============================================================================

/// Opens a download. Delivered to the plugin when the call starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetObjectRequest {
    pub object: ObjectKey,
}

impl GetObjectRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            object: ObjectKey::new(bucket, key),
        }
    }
}

/// One chunk of a downloaded object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetObjectResponse {
    pub file_chunk: Bytes,
}

impl GetObjectResponse {
    pub fn new(file_chunk: impl Into<Bytes>) -> Self {
        Self {
            file_chunk: file_chunk.into(),
        }
    }
}

impl StreamMessage for GetObjectResponse {
    fn is_empty(&self) -> bool {
        self.file_chunk.is_empty()
    }
}

// =============================================================================
// PutObject
// =============================================================================

/// One upload message. The first names the object, the rest carry its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutObjectRequest {
    Metadata(ObjectKey),
    Chunk(Bytes),
}

impl PutObjectRequest {
    pub fn metadata(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        PutObjectRequest::Metadata(ObjectKey::new(bucket, key))
    }

    pub fn chunk(data: impl Into<Bytes>) -> Self {
        PutObjectRequest::Chunk(data.into())
    }
}

impl StreamMessage for PutObjectRequest {
    fn is_empty(&self) -> bool {
        match self {
            PutObjectRequest::Metadata(object) => object.key.is_empty(),
            PutObjectRequest::Chunk(data) => data.is_empty(),
        }
    }
}

/// Terminal acknowledgement of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectResponse {
    /// Hex-encoded blake3 digest of the stored bytes
    pub checksum: String,

    /// Stored object size in bytes
    pub size: u64,
}

impl StreamMessage for PutObjectResponse {
    fn is_empty(&self) -> bool {
        self.checksum.is_empty()
    }
}
