//! Operation tracking for async management calls
//!
//! Every mutating call against the management API is accepted immediately
//! and completes out-of-band; this module polls the returned request id
//! until the operation leaves `InProgress`, with optional progress callbacks
//! for UI updates.

use crate::error::{CoreError, Result};
use azure_asm::AsmClient;
use azure_asm::operations::Operation;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Progress events emitted while waiting on an operation
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Polling has started for the operation
    Started { request_id: String },
    /// Polling iteration with the status reported by the provider
    Polling {
        request_id: String,
        status: String,
        elapsed: Duration,
    },
    /// The operation completed successfully
    Succeeded { request_id: String },
    /// The operation reached terminal `Failed` status
    Failed { request_id: String, error: String },
}

/// Callback type for progress updates
///
/// A CLI can use this to drive spinners; most library callers pass `None`.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Poll an asynchronous operation until it reaches a terminal state
///
/// Each poll fetches `operations/{request_id}`. Connection-level transport
/// failures are retried after `interval` - they say nothing about the state
/// of the remote operation, so they are never conflated with a terminal
/// `Failed` status. API-level errors surface immediately.
///
/// # Arguments
///
/// * `client` - The management API client
/// * `request_id` - The tracking token returned by the submission call
/// * `timeout` - Maximum time to wait for completion
/// * `interval` - Time between polling attempts
/// * `on_progress` - Optional callback for progress updates
///
/// # Returns
///
/// The terminal [`Operation`] on success. A terminal `Failed` status becomes
/// [`CoreError::OperationFailed`] carrying the provider's code and message
/// verbatim; an elapsed wait ceiling becomes [`CoreError::OperationTimeout`],
/// which is deliberately distinct - the operation may still complete
/// server-side after the local caller gives up.
pub async fn wait_for_operation(
    client: &AsmClient,
    request_id: &str,
    timeout: Duration,
    interval: Duration,
    on_progress: Option<&ProgressCallback>,
) -> Result<Operation> {
    let start = Instant::now();
    let handler = client.operations();

    emit(
        on_progress,
        ProgressEvent::Started {
            request_id: request_id.to_string(),
        },
    );

    loop {
        let elapsed = start.elapsed();
        if elapsed > timeout {
            warn!(request_id, ?timeout, "gave up waiting for operation");
            return Err(CoreError::OperationTimeout(timeout));
        }

        let operation = match handler.get(request_id).await {
            Ok(operation) => operation,
            Err(e) if e.is_connection() => {
                // no answer yet, not a verdict on the operation
                debug!(request_id, error = %e, "poll failed at transport level, retrying");
                tokio::time::sleep(interval).await;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        emit(
            on_progress,
            ProgressEvent::Polling {
                request_id: request_id.to_string(),
                status: operation.status.clone(),
                elapsed,
            },
        );

        if operation.is_succeeded() {
            debug!(request_id, elapsed = ?elapsed, "operation succeeded");
            emit(
                on_progress,
                ProgressEvent::Succeeded {
                    request_id: request_id.to_string(),
                },
            );
            return Ok(operation);
        }

        if operation.is_failed() {
            let (code, message) = operation.error_details();
            emit(
                on_progress,
                ProgressEvent::Failed {
                    request_id: request_id.to_string(),
                    error: format!("{}: {}", code, message),
                },
            );
            return Err(CoreError::OperationFailed { code, message });
        }

        // InProgress; the wire contract defines only the three literal
        // statuses, so anything unrecognized degrades to more polling
        if !operation.is_in_progress() {
            debug!(request_id, status = %operation.status, "unrecognized operation status");
        }
        tokio::time::sleep(interval).await;
    }
}

/// Helper to emit progress events
fn emit(callback: Option<&ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}
