//! Unified error handling for azure-asm-core
//!
//! Wraps client errors and adds the workflow-level failure classes: local
//! validation, terminal operation failure, wait-ceiling timeout and failed
//! compensation. The last two matter most to callers: a timeout says nothing
//! about the remote operation's eventual outcome, while a terminal `Failed`
//! status is the provider's verdict.
//!
//! # Example
//!
//! ```rust
//! use azure_asm_core::CoreError;
//!
//! fn handle_error(err: CoreError) {
//!     if err.is_timeout() {
//!         println!("Operation may still complete server-side");
//!     } else if err.is_retryable() {
//!         println!("Temporary error, can retry");
//!     }
//! }
//! ```

use crate::config::ConfigError;
use std::time::Duration;
use thiserror::Error;

/// Core error type for workflow operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Bad caller input, detected locally before any remote call
    #[error("validation error: {0}")]
    Validation(String),

    /// Error from the Service Management API client
    #[error("management API error: {0}")]
    Asm(#[from] azure_asm::AsmError),

    /// An asynchronous operation reached terminal `Failed` status
    #[error("operation failed: {code}: {message}")]
    OperationFailed { code: String, message: String },

    /// The wait ceiling elapsed while the operation was still in progress
    #[error("operation timed out after {0:?}")]
    OperationTimeout(Duration),

    /// A rollback step failed after a workflow error; carries both so the
    /// original cause is never masked
    #[error("{original} (compensation also failed: {rollback})")]
    CompensationFailed {
        original: Box<CoreError>,
        rollback: Box<CoreError>,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::Asm(e) if e.is_not_found())
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CoreError::Asm(e) if e.is_unauthorized())
    }

    /// Returns true if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, CoreError::Asm(e) if e.is_server_error())
    }

    /// Returns true if this is a timeout, at the transport layer or the
    /// operation wait ceiling
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            CoreError::Asm(e) => e.is_timeout(),
            CoreError::OperationTimeout(_) => true,
            _ => false,
        }
    }

    /// Returns true if this is a conflict error (409)
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, CoreError::Asm(e) if e.is_conflict())
    }

    /// Returns true if this is a bad request, remote (400) or local validation
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        match self {
            CoreError::Asm(e) => e.is_bad_request(),
            CoreError::Validation(_) => true,
            _ => false,
        }
    }

    /// Returns true if this error is potentially retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Asm(e) => e.is_retryable(),
            // a timed-out operation may have completed server-side; retrying
            // the poll is safe, retrying the submission may not be
            CoreError::OperationTimeout(_) => true,
            _ => false,
        }
    }

    /// The original workflow error, unwrapping a failed compensation
    #[must_use]
    pub fn original(&self) -> &CoreError {
        match self {
            CoreError::CompensationFailed { original, .. } => original.original(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azure_asm::AsmError;

    #[test]
    fn test_core_error_from_asm() {
        let asm_err = AsmError::NotFound {
            message: "The hosted service does not exist.".to_string(),
        };
        let core_err: CoreError = asm_err.into();

        assert!(core_err.is_not_found());
        assert!(!core_err.is_unauthorized());
        assert!(!core_err.is_retryable());
    }

    #[test]
    fn test_asm_helpers_delegate() {
        let unauthorized: CoreError = AsmError::AuthenticationFailed {
            message: "certificate rejected".to_string(),
        }
        .into();
        assert!(unauthorized.is_unauthorized());

        let server_error: CoreError = AsmError::ServerError {
            message: "internal error".to_string(),
        }
        .into();
        assert!(server_error.is_server_error());
        assert!(server_error.is_retryable());

        let conflict: CoreError = AsmError::Conflict {
            message: "busy".to_string(),
        }
        .into();
        assert!(conflict.is_conflict());
    }

    #[test]
    fn test_operation_timeout_is_distinct_from_failure() {
        let timeout = CoreError::OperationTimeout(Duration::from_secs(600));
        assert!(timeout.is_timeout());
        assert!(timeout.is_retryable());
        assert!(!matches!(timeout, CoreError::OperationFailed { .. }));

        let failed = CoreError::OperationFailed {
            code: "ResourceNotFound".to_string(),
            message: "gone".to_string(),
        };
        assert!(!failed.is_timeout());
        assert!(!failed.is_retryable());
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = CoreError::Validation("instance size not available".to_string());
        assert!(err.is_bad_request());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_compensation_failed_keeps_both_causes() {
        let original = CoreError::OperationFailed {
            code: "CertificateInvalid".to_string(),
            message: "bad certificate".to_string(),
        };
        let rollback = CoreError::Asm(AsmError::Conflict {
            message: "service busy".to_string(),
        });
        let err = CoreError::CompensationFailed {
            original: Box::new(original),
            rollback: Box::new(rollback),
        };

        let message = err.to_string();
        assert!(message.contains("CertificateInvalid"));
        assert!(message.contains("service busy"));
        assert!(matches!(
            err.original(),
            CoreError::OperationFailed { code, .. } if code == "CertificateInvalid"
        ));
    }
}
