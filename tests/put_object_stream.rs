//! PutObject upload stream behavior: independent halves, one terminal message.

mod common;

use bytes::Bytes;
use common::{init_tracing, BLOCKED, PROMPT};
use objstream::streaming::{PutObjectRequest, PutObjectResponse, PutObjectStream};
use objstream::{Code, Status, StreamError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::timeout;

fn ack(checksum: &str, size: u64) -> PutObjectResponse {
    PutObjectResponse {
        checksum: checksum.to_string(),
        size,
    }
}

// =============================================================================
// End-to-end scenarios
// =============================================================================

#[tokio::test]
async fn test_upload_success() {
    init_tracing();
    let (client, server) = PutObjectStream::new().split();

    let backend = tokio::spawn(async move {
        let mut received = Vec::new();
        while let Some(request) = server.recv().await {
            received.push(request);
        }
        // Request half is drained; it stays at end-of-stream.
        assert_eq!(server.recv().await, None);
        assert!(!server.is_response_closed());

        server.send_and_close(ack("r", 2)).await.unwrap();
        assert!(server.is_response_closed());
        received
    });

    client.send(PutObjectRequest::chunk("x")).await.unwrap();
    client.send(PutObjectRequest::chunk("y")).await.unwrap();
    client.close_send().unwrap();

    let result = client.close_and_recv().await;
    assert_eq!(result, Ok(Some(ack("r", 2))));

    let received = backend.await.unwrap();
    assert_eq!(
        received,
        vec![PutObjectRequest::chunk("x"), PutObjectRequest::chunk("y")]
    );
}

#[tokio::test]
async fn test_upload_abrupt_termination() {
    init_tracing();
    let stream = PutObjectStream::new();
    let (client, server) = stream.split();

    let backend = tokio::spawn(async move {
        assert_eq!(server.recv().await, Some(PutObjectRequest::chunk("x")));
        // Response half closed without a result or an error.
        server.close();
        server
    });

    client.send(PutObjectRequest::chunk("x")).await.unwrap();

    let result = timeout(PROMPT, client.close_and_recv()).await.unwrap();
    assert_eq!(result, Ok(None));

    let server = backend.await.unwrap();
    assert!(server.is_response_closed());
}

#[tokio::test]
async fn test_upload_rejected_by_backend() {
    let (client, server) = PutObjectStream::new().split();

    let backend = tokio::spawn(async move {
        let _ = server.recv().await;
        let res = server
            .send_error(Status::new(Code::PermissionDenied, "bucket is read-only"))
            .await;
        assert!(server.is_response_closed());
        assert!(server.is_request_closed());
        res
    });

    client
        .send(PutObjectRequest::metadata("recordings", "sr_1.bsr"))
        .await
        .unwrap();

    let err = client.close_and_recv().await.unwrap_err();
    assert_eq!(err.code(), Code::PermissionDenied);
    assert!(client.is_response_closed());

    backend.await.unwrap().unwrap();

    // Exactly one terminal message: nothing follows the error.
    assert_eq!(client.close_and_recv().await, Ok(None));
}

// =============================================================================
// Half independence
// =============================================================================

#[tokio::test]
async fn test_half_close_keeps_response_open() {
    let (client, server) = PutObjectStream::new().split();

    client.close_send().unwrap();
    assert!(client.is_request_closed());
    assert!(!client.is_response_closed());
    assert_eq!(server.recv().await, None);

    let backend = tokio::spawn(async move { server.send_and_close(ack("done", 0)).await });

    assert_eq!(client.close_and_recv().await, Ok(Some(ack("done", 0))));
    backend.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_close_and_recv_waits_for_result() {
    let (client, server) = PutObjectStream::new().split();
    let client = Arc::new(client);

    let waiter = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.close_and_recv().await })
    };

    tokio::time::sleep(BLOCKED).await;
    assert!(!waiter.is_finished());
    // Waiting for the result already ended the request half.
    assert!(server.is_request_closed());

    server.send_and_close(ack("late", 4)).await.unwrap();
    let result = timeout(PROMPT, waiter).await.unwrap().unwrap();
    assert_eq!(result, Ok(Some(ack("late", 4))));
}

#[tokio::test]
async fn test_send_blocks_until_server_reads() {
    let (client, server) = PutObjectStream::new().split();

    assert!(timeout(BLOCKED, client.send(PutObjectRequest::chunk("a")))
        .await
        .is_err());

    let backend = tokio::spawn(async move { server.recv().await });
    client.send(PutObjectRequest::chunk("b")).await.unwrap();
    assert_eq!(
        backend.await.unwrap(),
        Some(PutObjectRequest::chunk("b"))
    );
}

// =============================================================================
// Rejections
// =============================================================================

#[tokio::test]
async fn test_invalid_arguments_do_not_change_state() {
    let (client, server) = PutObjectStream::new().split();

    let res = client.send(PutObjectRequest::chunk(Bytes::new())).await;
    assert!(matches!(res, Err(StreamError::InvalidArgument(_))));

    let res = client
        .send(PutObjectRequest::metadata("recordings", ""))
        .await;
    assert!(matches!(res, Err(StreamError::InvalidArgument(_))));

    let res = server.send_and_close(ack("", 0)).await;
    assert!(matches!(res, Err(StreamError::InvalidArgument(_))));

    assert!(!client.is_request_closed());
    assert!(!client.is_response_closed());
}

#[tokio::test]
async fn test_completion_on_closed_response_fails_fast() {
    let (client, server) = PutObjectStream::new().split();
    drop(client);

    let res = timeout(BLOCKED, server.send_and_close(ack("r", 1)))
        .await
        .unwrap();
    assert_eq!(res, Err(StreamError::AlreadyClosed));

    let res = timeout(BLOCKED, server.send_error(Status::internal("x")))
        .await
        .unwrap();
    assert_eq!(res, Err(StreamError::AlreadyClosed));
}

#[tokio::test]
async fn test_send_after_server_completed() {
    let (client, server) = PutObjectStream::new().split();

    let backend = tokio::spawn(async move {
        server
            .send_error(Status::invalid_argument("first message must name the object"))
            .await
    });

    // The error reply ends the request half too, so this cannot hang.
    let res = timeout(PROMPT, client.send(PutObjectRequest::chunk("data")))
        .await
        .unwrap();
    assert_eq!(res, Err(StreamError::AlreadyClosed));
    assert_eq!(client.close_send(), Err(StreamError::AlreadyClosed));

    let err = client.close_and_recv().await.unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);
    backend.await.unwrap().unwrap();
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_close_of_each_half() {
    let stream = PutObjectStream::new();
    let (client, server) = stream.split();
    let client = Arc::new(client);
    let server = Arc::new(server);
    let request_closes = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for i in 0..32 {
        let client = Arc::clone(&client);
        let server = Arc::clone(&server);
        let request_closes = Arc::clone(&request_closes);
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                if client.close_send().is_ok() {
                    request_closes.fetch_add(1, Ordering::SeqCst);
                }
            } else {
                server.close();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Server closes may have beaten every client close_send.
    assert!(request_closes.load(Ordering::SeqCst) <= 1);
    assert!(client.is_request_closed());
    assert!(client.is_response_closed());
    assert!(server.is_request_closed());
    assert!(server.is_response_closed());
}
