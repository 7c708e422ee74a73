//! Server endpoints as generic transport streams.

use super::ServerStream;
use crate::error::StreamError;
use crate::streaming::{
    Frame, GetObjectRequest, GetObjectResponse, GetObjectServer, PutObjectRequest,
    PutObjectResponse, PutObjectServer,
};
use async_trait::async_trait;

#[async_trait]
impl ServerStream for GetObjectServer {
    type Request = GetObjectRequest;
    type Response = GetObjectResponse;

    async fn send_msg(&self, frame: Frame<GetObjectResponse>) -> Result<(), StreamError> {
        match frame {
            Frame::Message(response) => self.send(response).await,
            Frame::Error(status) => self.send_error(status).await,
        }
    }

    /// The single request was delivered when the call started.
    async fn recv_msg(&self) -> Option<GetObjectRequest> {
        None
    }
}

#[async_trait]
impl ServerStream for PutObjectServer {
    type Request = PutObjectRequest;
    type Response = PutObjectResponse;

    /// A payload is the upload's one result, so it closes the response half
    /// just like `send_and_close`.
    async fn send_msg(&self, frame: Frame<PutObjectResponse>) -> Result<(), StreamError> {
        match frame {
            Frame::Message(response) => self.send_and_close(response).await,
            Frame::Error(status) => self.send_error(status).await,
        }
    }

    async fn recv_msg(&self) -> Option<PutObjectRequest> {
        self.recv().await
    }
}
