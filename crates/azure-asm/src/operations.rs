//! Asynchronous operation status
//!
//! Every accepted mutating call returns an `x-ms-request-id`; the operation
//! runs server-side and its status is polled through this handler until it
//! leaves `InProgress`.

use crate::client::AsmClient;
use crate::error::Result;
use serde::Deserialize;

/// Status value while an operation is still running
pub const STATUS_IN_PROGRESS: &str = "InProgress";
/// Status value of an operation that completed successfully
pub const STATUS_SUCCEEDED: &str = "Succeeded";
/// Status value of an operation that failed server-side
pub const STATUS_FAILED: &str = "Failed";

/// Typed view of the three status literals the wire contract defines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    InProgress,
    Succeeded,
    Failed,
}

impl OperationStatus {
    /// Parse a wire literal; anything outside the contract yields `None`
    #[must_use]
    pub fn from_wire(status: &str) -> Option<Self> {
        match status {
            STATUS_IN_PROGRESS => Some(Self::InProgress),
            STATUS_SUCCEEDED => Some(Self::Succeeded),
            STATUS_FAILED => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Status of an asynchronous management operation
#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "HttpStatusCode")]
    pub http_status_code: Option<String>,
    #[serde(rename = "Error")]
    pub error: Option<OperationError>,
}

/// Failure detail reported for a failed operation
#[derive(Debug, Clone, Deserialize)]
pub struct OperationError {
    #[serde(rename = "Code")]
    pub code: Option<String>,
    #[serde(rename = "Message")]
    pub message: Option<String>,
}

impl Operation {
    /// Typed status; `None` when the literal is outside the wire contract
    #[must_use]
    pub fn operation_status(&self) -> Option<OperationStatus> {
        OperationStatus::from_wire(&self.status)
    }

    /// Whether the operation is still running
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.operation_status() == Some(OperationStatus::InProgress)
    }

    /// Whether the operation completed successfully
    #[must_use]
    pub fn is_succeeded(&self) -> bool {
        self.operation_status() == Some(OperationStatus::Succeeded)
    }

    /// Whether the operation failed server-side
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.operation_status() == Some(OperationStatus::Failed)
    }

    /// Error code and message of a failed operation.
    ///
    /// Missing pieces come back empty rather than panicking; the API is not
    /// guaranteed to populate the error element.
    #[must_use]
    pub fn error_details(&self) -> (String, String) {
        match &self.error {
            Some(error) => (
                error.code.clone().unwrap_or_default(),
                error.message.clone().unwrap_or_default(),
            ),
            None => (String::new(), String::new()),
        }
    }
}

/// Handler for operation status lookups
pub struct OperationHandler {
    client: AsmClient,
}

impl OperationHandler {
    pub fn new(client: AsmClient) -> Self {
        Self { client }
    }

    /// Fetch the current status of an operation by its request id
    pub async fn get(&self, request_id: &str) -> Result<Operation> {
        self.client
            .get_xml(&format!("operations/{}", urlencoding::encode(request_id)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_in_progress() {
        let xml = r#"<Operation xmlns="http://schemas.microsoft.com/windowsazure">
            <ID>req-123</ID>
            <Status>InProgress</Status>
        </Operation>"#;
        let op: Operation = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(op.id, "req-123");
        assert!(op.is_in_progress());
        assert!(!op.is_succeeded());
        assert!(!op.is_failed());
    }

    #[test]
    fn test_parse_failed_with_error() {
        let xml = r#"<Operation xmlns="http://schemas.microsoft.com/windowsazure">
            <ID>req-456</ID>
            <Status>Failed</Status>
            <HttpStatusCode>400</HttpStatusCode>
            <Error>
                <Code>BadRequest</Code>
                <Message>The image name is invalid.</Message>
            </Error>
        </Operation>"#;
        let op: Operation = quick_xml::de::from_str(xml).unwrap();
        assert!(op.is_failed());
        assert_eq!(op.http_status_code.as_deref(), Some("400"));
        let (code, message) = op.error_details();
        assert_eq!(code, "BadRequest");
        assert_eq!(message, "The image name is invalid.");
    }

    #[test]
    fn test_error_details_default_to_empty() {
        let xml = r#"<Operation>
            <ID>req-789</ID>
            <Status>Failed</Status>
        </Operation>"#;
        let op: Operation = quick_xml::de::from_str(xml).unwrap();
        let (code, message) = op.error_details();
        assert!(code.is_empty());
        assert!(message.is_empty());
    }

    #[test]
    fn test_unknown_status_is_not_terminal() {
        let xml = r#"<Operation>
            <ID>req-1</ID>
            <Status>Throttled</Status>
        </Operation>"#;
        let op: Operation = quick_xml::de::from_str(xml).unwrap();
        assert!(op.operation_status().is_none());
        assert!(!op.is_in_progress());
        assert!(!op.is_succeeded());
        assert!(!op.is_failed());
    }
}
