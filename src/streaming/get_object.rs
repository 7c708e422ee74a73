//! GetObject download stream.
//!
//! One channel of responses flows server -> client. The server pushes chunks
//! and ends the stream with [`GetObjectServer::finish`] or a carried error;
//! the client pulls until end-of-stream and may close early to abandon the
//! download.

use crate::error::{Status, StreamError};
use crate::streaming::channel::HandoffChannel;
use crate::streaming::protocol::{GetObjectResponse, StreamMessage};
use futures::Stream;
use std::sync::Arc;

type Item = Result<GetObjectResponse, Status>;

/// A connected GetObject stream, before it is split into its two endpoints.
#[derive(Debug)]
pub struct GetObjectStream {
    channel: Arc<HandoffChannel<Item>>,
}

impl GetObjectStream {
    pub fn new() -> Self {
        Self {
            channel: Arc::new(HandoffChannel::new()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.channel.is_closed()
    }

    pub fn close(&self) -> bool {
        self.channel.close()
    }

    /// Split into the client and server endpoints. These are the only two
    /// handles that will ever share this stream.
    pub fn split(self) -> (GetObjectClient, GetObjectServer) {
        let client = GetObjectClient {
            channel: Arc::clone(&self.channel),
        };
        let server = GetObjectServer {
            channel: self.channel,
        };
        (client, server)
    }
}

impl Default for GetObjectStream {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Client (consumer)
// =============================================================================

/// Host side of a download: pulls chunks sent by the plugin.
///
/// Dropping the client closes the stream.
#[derive(Debug)]
pub struct GetObjectClient {
    channel: Arc<HandoffChannel<Item>>,
}

impl GetObjectClient {
    /// Wait for the next chunk.
    ///
    /// `Ok(None)` means the server finished (or either side closed the stream).
    /// `Err` is an error carried from the server; the stream is closed after it
    /// and every later call returns `Ok(None)`.
    pub async fn recv(&self) -> Result<Option<GetObjectResponse>, Status> {
        match self.channel.recv().await {
            None => Ok(None),
            Some(Ok(response)) => Ok(Some(response)),
            Some(Err(status)) => {
                self.channel.close();
                Err(status)
            }
        }
    }

    /// Abandon the download. The server's next send fails with `AlreadyClosed`.
    pub fn close_send(&self) -> Result<(), StreamError> {
        if !self.channel.close() {
            return Err(StreamError::AlreadyClosed);
        }
        tracing::debug!("GetObject stream closed by client");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.channel.is_closed()
    }

    /// Adapt into a `Stream` of chunks that ends after end-of-stream or the
    /// first carried error.
    pub fn into_stream(self) -> impl Stream<Item = Result<GetObjectResponse, Status>> {
        futures::stream::unfold(Some(self), |client| async move {
            let client = client?;
            match client.recv().await {
                Ok(Some(response)) => Some((Ok(response), Some(client))),
                Ok(None) => None,
                Err(status) => Some((Err(status), None)),
            }
        })
    }
}

impl Drop for GetObjectClient {
    fn drop(&mut self) {
        if self.channel.close() {
            tracing::debug!("GetObject client dropped, stream closed");
        }
    }
}

// =============================================================================
// Server (producer)
// =============================================================================

/// Plugin side of a download: pushes chunks to the host.
///
/// Dropping the server closes the stream, which the client sees as end-of-stream.
#[derive(Debug)]
pub struct GetObjectServer {
    channel: Arc<HandoffChannel<Item>>,
}

impl GetObjectServer {
    /// Send one chunk, waiting until the client takes it.
    pub async fn send(&self, response: GetObjectResponse) -> Result<(), StreamError> {
        if response.is_empty() {
            return Err(StreamError::InvalidArgument(
                "GetObjectResponse chunk cannot be empty",
            ));
        }
        self.channel.send(Ok(response)).await
    }

    /// Deliver a terminal error to the client, then close the stream.
    ///
    /// The stream is closed afterwards even if the delivery itself failed.
    pub async fn send_error(&self, status: Status) -> Result<(), StreamError> {
        let code = status.code();
        let res = self.channel.send(Err(status)).await;
        self.channel.close();
        if res.is_ok() {
            tracing::debug!(%code, "GetObject stream delivered error");
        }
        res
    }

    /// End the download normally: the client's next `recv` returns `Ok(None)`.
    pub fn finish(&self) -> Result<(), StreamError> {
        if !self.channel.close() {
            return Err(StreamError::AlreadyClosed);
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.channel.is_closed()
    }
}

impl Drop for GetObjectServer {
    fn drop(&mut self) {
        if self.channel.close() {
            tracing::debug!("GetObject server dropped, stream closed");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
