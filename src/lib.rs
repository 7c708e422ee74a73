//! objstream - streaming object transfer across the storage plugin boundary.
//!
//! The GetObject (download) and PutObject (upload) streams carry large objects,
//! such as archived session recordings, between a host and a storage plugin.
//! This crate implements their contract in memory: unbuffered hand-off, half-close,
//! carried terminal errors, and close-exactly-once under concurrent access.
//!
//! ```no_run
//! # async fn demo() -> anyhow::Result<()> {
//! use bytes::Bytes;
//! use objstream::config::LoopbackConfig;
//! use objstream::plugin::{LoopbackStorage, PluginClient};
//! use objstream::streaming::{GetObjectRequest, ObjectKey};
//!
//! let client = PluginClient::new(LoopbackStorage::new(LoopbackConfig::default())?);
//! let key = ObjectKey::new("recordings", "sr_1234.bsr");
//! client.upload(key, Bytes::from_static(b"recording"), 4).await?;
//! let data = client
//!     .download(GetObjectRequest::new("recordings", "sr_1234.bsr"))
//!     .await?;
//! assert_eq!(data, "recording");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod plugin;
pub mod streaming;
pub mod transport;

pub use error::{Code, Status, StreamError, TransferError};
