//! Client endpoints as generic transport streams.

use super::ClientStream;
use crate::error::{Status, StreamError};
use crate::streaming::{GetObjectClient, GetObjectResponse, PutObjectClient, PutObjectResponse};
use async_trait::async_trait;

#[async_trait]
impl ClientStream for GetObjectClient {
    type Response = GetObjectResponse;

    fn close_send(&self) -> Result<(), StreamError> {
        GetObjectClient::close_send(self)
    }

    async fn recv_msg(&self) -> Result<Option<GetObjectResponse>, Status> {
        self.recv().await
    }
}

#[async_trait]
impl ClientStream for PutObjectClient {
    type Response = PutObjectResponse;

    fn close_send(&self) -> Result<(), StreamError> {
        PutObjectClient::close_send(self)
    }

    /// Waits on the response half without closing the request half; pair with
    /// `close_send` first, as `close_and_recv` does.
    async fn recv_msg(&self) -> Result<Option<PutObjectResponse>, Status> {
        self.recv_response().await
    }
}
