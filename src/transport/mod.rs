//! Transport-conformance surface for stream endpoints.
//!
//! RPC stream abstractions expect metadata accessors, a request scope and
//! generic send/receive entry points. An in-memory stream has no headers,
//! trailers or deadlines, so those carry fixed behavior here. The generic
//! entry points route through the same typed operations as everything else.
//!
//! Nothing in `streaming` depends on this module.

mod client;
mod server;

use crate::error::{Status, StreamError};
use crate::streaming::Frame;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Instant;

/// Request/response metadata (header or trailer).
pub type Metadata = HashMap<String, Vec<String>>;

/// Lifetime of one call. In-memory calls always run in the background scope:
/// never cancelled, no deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestScope {
    _private: (),
}

impl RequestScope {
    pub fn background() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        false
    }

    pub fn deadline(&self) -> Option<Instant> {
        None
    }

    /// Resolves when the call is cancelled, which in this scope is never.
    pub async fn cancelled(&self) {
        std::future::pending::<()>().await
    }
}

/// Client endpoint of a streaming call.
#[async_trait]
pub trait ClientStream: Send + Sync {
    type Response: Send;

    /// Always empty.
    fn header(&self) -> Result<Metadata, StreamError> {
        Ok(Metadata::new())
    }

    /// Always empty.
    fn trailer(&self) -> Metadata {
        Metadata::new()
    }

    fn scope(&self) -> RequestScope {
        RequestScope::background()
    }

    fn close_send(&self) -> Result<(), StreamError>;

    /// Receive the next server message through the generic path.
    async fn recv_msg(&self) -> Result<Option<Self::Response>, Status>;
}

/// Server endpoint of a streaming call.
#[async_trait]
pub trait ServerStream: Send + Sync {
    type Request: Send;
    type Response: Send;

    fn set_header(&self, _md: Metadata) -> Result<(), StreamError> {
        Ok(())
    }

    fn send_header(&self, _md: Metadata) -> Result<(), StreamError> {
        Ok(())
    }

    fn set_trailer(&self, _md: Metadata) {}

    fn scope(&self) -> RequestScope {
        RequestScope::background()
    }

    /// Send a payload or a terminal error through the generic path. Rejections
    /// match the typed operations exactly.
    async fn send_msg(&self, frame: Frame<Self::Response>) -> Result<(), StreamError>;

    /// Receive the next client message through the generic path.
    async fn recv_msg(&self) -> Option<Self::Request>;
}
