//! Operation polling behavior against a mock management endpoint

use azure_asm::AsmClient;
use azure_asm::testing::{MockAsmServer, OperationFixture};
use azure_asm_core::{CoreError, ProgressCallback, ProgressEvent, wait_for_operation};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const WAIT_BUDGET: Duration = Duration::from_millis(500);

#[tokio::test]
async fn test_polls_until_succeeded() {
    let server = MockAsmServer::start().await;
    server
        .mock_operation_sequence(
            "op-1",
            vec![
                OperationFixture::new("op-1").in_progress().build(),
                OperationFixture::new("op-1").in_progress().build(),
                OperationFixture::new("op-1").succeeded().build(),
            ],
        )
        .await;
    let client = server.client();

    let operation = wait_for_operation(&client, "op-1", WAIT_BUDGET, POLL_INTERVAL, None)
        .await
        .unwrap();
    assert!(operation.is_succeeded());

    let requests = server.server().received_requests().await.unwrap();
    assert_eq!(requests.len(), 3, "every status poll hits the endpoint once");
}

#[tokio::test]
async fn test_stuck_operation_times_out() {
    let server = MockAsmServer::start().await;
    server
        .mock_operation("op-1", OperationFixture::new("op-1").in_progress().build())
        .await;
    let client = server.client();

    let err = wait_for_operation(
        &client,
        "op-1",
        Duration::from_millis(100),
        POLL_INTERVAL,
        None,
    )
    .await
    .unwrap_err();

    // the wait ceiling is not a verdict on the operation
    assert!(matches!(err, CoreError::OperationTimeout(_)));
    assert!(err.is_timeout());
    assert!(!matches!(err, CoreError::OperationFailed { .. }));
}

#[tokio::test]
async fn test_failed_operation_carries_provider_error() {
    let server = MockAsmServer::start().await;
    server
        .mock_operation(
            "op-1",
            OperationFixture::new("op-1")
                .failed("ResourceNotFound", "The image does not exist.")
                .build(),
        )
        .await;
    let client = server.client();

    let err = wait_for_operation(&client, "op-1", WAIT_BUDGET, POLL_INTERVAL, None)
        .await
        .unwrap_err();

    match err {
        CoreError::OperationFailed { code, message } => {
            assert_eq!(code, "ResourceNotFound");
            assert_eq!(message, "The image does not exist.");
        }
        other => panic!("expected OperationFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_errors_are_retried_not_terminal() {
    // nothing listens on this port, so every poll fails at the transport
    // level; the tracker must keep retrying until the wait ceiling instead
    // of reporting the operation as failed
    let client = AsmClient::builder()
        .subscription_id("test-subscription")
        .base_url("http://127.0.0.1:9")
        .build()
        .unwrap();

    let err = wait_for_operation(
        &client,
        "op-1",
        Duration::from_millis(100),
        POLL_INTERVAL,
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CoreError::OperationTimeout(_)));
}

#[tokio::test]
async fn test_progress_events_bracket_the_wait() {
    let server = MockAsmServer::start().await;
    server
        .mock_operation_sequence(
            "op-1",
            vec![
                OperationFixture::new("op-1").in_progress().build(),
                OperationFixture::new("op-1").succeeded().build(),
            ],
        )
        .await;
    let client = server.client();

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let callback: ProgressCallback = Box::new(move |event| {
        sink.lock().unwrap().push(event);
    });

    wait_for_operation(&client, "op-1", WAIT_BUDGET, POLL_INTERVAL, Some(&callback))
        .await
        .unwrap();

    let events = events.lock().unwrap();
    assert!(matches!(events.first(), Some(ProgressEvent::Started { .. })));
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::Succeeded { .. })
    ));
    let polls = events
        .iter()
        .filter(|event| matches!(event, ProgressEvent::Polling { .. }))
        .count();
    assert_eq!(polls, 2);
}
