//! PutObject upload stream.
//!
//! Two halves with independent guards:
//! - request half: client -> server chunks, ended by the client's half-close
//! - response half: exactly one terminal message server -> client
//!
//! A server that completes (result, error or abrupt close) also closes the
//! request half, since it will not read further; a client still sending sees
//! `AlreadyClosed` and moves on to collect the outcome.

use crate::error::{Status, StreamError};
use crate::streaming::channel::HandoffChannel;
use crate::streaming::protocol::{PutObjectRequest, PutObjectResponse, StreamMessage};
use std::sync::Arc;

#[derive(Debug)]
struct Shared {
    requests: HandoffChannel<PutObjectRequest>,
    responses: HandoffChannel<Result<PutObjectResponse, Status>>,
}

impl Shared {
    fn close_all(&self) -> bool {
        let requests = self.requests.close();
        let responses = self.responses.close();
        requests || responses
    }
}

/// A connected PutObject stream, before it is split into its two endpoints.
#[derive(Debug)]
pub struct PutObjectStream {
    shared: Arc<Shared>,
}

impl PutObjectStream {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                requests: HandoffChannel::new(),
                responses: HandoffChannel::new(),
            }),
        }
    }

    pub fn is_request_closed(&self) -> bool {
        self.shared.requests.is_closed()
    }

    pub fn is_response_closed(&self) -> bool {
        self.shared.responses.is_closed()
    }

    pub fn close_request(&self) -> bool {
        self.shared.requests.close()
    }

    pub fn close_response(&self) -> bool {
        self.shared.responses.close()
    }

    pub fn split(self) -> (PutObjectClient, PutObjectServer) {
        let client = PutObjectClient {
            shared: Arc::clone(&self.shared),
        };
        let server = PutObjectServer {
            shared: self.shared,
        };
        (client, server)
    }
}

impl Default for PutObjectStream {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Client (uploader)
// =============================================================================

/// Host side of an upload.
///
/// Dropping the client closes both halves.
#[derive(Debug)]
pub struct PutObjectClient {
    shared: Arc<Shared>,
}

impl PutObjectClient {
    /// Send one request, waiting until the server takes it.
    pub async fn send(&self, request: PutObjectRequest) -> Result<(), StreamError> {
        if request.is_empty() {
            return Err(StreamError::InvalidArgument(
                "PutObjectRequest cannot be empty",
            ));
        }
        self.shared.requests.send(request).await
    }

    /// Signal that no more requests follow. The server's next `recv` returns `None`.
    pub fn close_send(&self) -> Result<(), StreamError> {
        if !self.shared.requests.close() {
            return Err(StreamError::AlreadyClosed);
        }
        tracing::debug!("PutObject request half closed by client");
        Ok(())
    }

    /// Close the request half (if still open) and wait for the server's single
    /// terminal message.
    ///
    /// `Ok(None)` means the response half closed without a result. A well-formed
    /// upload always produces one, so callers should treat it as an unexpected
    /// termination.
    pub async fn close_and_recv(&self) -> Result<Option<PutObjectResponse>, Status> {
        self.shared.requests.close();
        self.recv_response().await
    }

    pub(crate) async fn recv_response(&self) -> Result<Option<PutObjectResponse>, Status> {
        let message = self.next_response().await;
        // The response half carries one message at most.
        self.shared.responses.close();
        match message {
            None => Ok(None),
            Some(Ok(response)) => Ok(Some(response)),
            Some(Err(status)) => Err(status),
        }
    }

    /// Take the terminal message, leaving the response half as the server left it.
    pub(crate) async fn next_response(&self) -> Option<Result<PutObjectResponse, Status>> {
        self.shared.responses.recv().await
    }

    pub fn is_request_closed(&self) -> bool {
        self.shared.requests.is_closed()
    }

    pub fn is_response_closed(&self) -> bool {
        self.shared.responses.is_closed()
    }
}

impl Drop for PutObjectClient {
    fn drop(&mut self) {
        if self.shared.close_all() {
            tracing::debug!("PutObject client dropped, stream closed");
        }
    }
}

// =============================================================================
// Server (storage backend)
// =============================================================================

/// Plugin side of an upload.
///
/// Dropping the server closes both halves; a client waiting in
/// `close_and_recv` then gets `Ok(None)`.
#[derive(Debug)]
pub struct PutObjectServer {
    shared: Arc<Shared>,
}

impl PutObjectServer {
    /// Wait for the next request. `None` once the client half-closed.
    pub async fn recv(&self) -> Option<PutObjectRequest> {
        self.shared.requests.recv().await
    }

    /// Deliver the upload result and close the response half.
    ///
    /// The request half is closed before delivery so a client blocked in `send`
    /// moves on to collect the result. If the response half closes while the
    /// result is in flight, this fails with `AlreadyClosed` and the request half
    /// stays closed; every path that closes the response half ends the request
    /// half too, so the stream is over either way.
    pub async fn send_and_close(&self, response: PutObjectResponse) -> Result<(), StreamError> {
        if response.is_empty() {
            return Err(StreamError::InvalidArgument(
                "PutObjectResponse cannot be empty",
            ));
        }
        if self.shared.responses.is_closed() {
            return Err(StreamError::AlreadyClosed);
        }
        self.shared.requests.close();
        self.shared.responses.send(Ok(response)).await?;
        self.shared.responses.close();
        Ok(())
    }

    /// Deliver a terminal error and close the response half, even if the
    /// delivery failed. The request half is closed first, as in `send_and_close`.
    pub async fn send_error(&self, status: Status) -> Result<(), StreamError> {
        if self.shared.responses.is_closed() {
            return Err(StreamError::AlreadyClosed);
        }
        tracing::debug!(%status, "PutObject stream carrying error");
        self.shared.requests.close();
        let res = self.shared.responses.send(Err(status)).await;
        self.shared.responses.close();
        res
    }

    /// End the upload without a result. The client's `close_and_recv` returns
    /// `Ok(None)`.
    pub fn close(&self) -> bool {
        self.shared.close_all()
    }

    pub fn is_request_closed(&self) -> bool {
        self.shared.requests.is_closed()
    }

    pub fn is_response_closed(&self) -> bool {
        self.shared.responses.is_closed()
    }
}

impl Drop for PutObjectServer {
    fn drop(&mut self) {
        if self.shared.close_all() {
            tracing::debug!("PutObject server dropped, stream closed");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
