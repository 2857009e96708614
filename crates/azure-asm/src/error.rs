//! Error handling for the Service Management client
//!
//! HTTP status codes are mapped to typed variants so callers can branch on
//! error class without string matching. The management API reports failures
//! as an `<Error>` document carrying a code and a message; both are folded
//! into the variant message as `code: message`.
//!
//! # Example
//!
//! ```rust
//! use azure_asm::AsmError;
//!
//! fn handle_error(err: AsmError) {
//!     if err.is_not_found() {
//!         println!("Resource not found");
//!     } else if err.is_retryable() {
//!         println!("Temporary error, can retry");
//!     }
//! }
//! ```

use serde::Deserialize;
use thiserror::Error;

/// Errors returned by the Service Management API client
#[derive(Error, Debug)]
pub enum AsmError {
    /// Network-level failure; the request never produced an API response
    #[error("connection error: {0}")]
    Connection(#[from] reqwest::Error),

    /// 400 Bad Request
    #[error("bad request: {message}")]
    BadRequest { message: String },

    /// 401/403 authentication or authorization failure
    #[error("authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// 404 Not Found
    #[error("not found: {message}")]
    NotFound { message: String },

    /// 409 Conflict
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// 429 Too Many Requests
    #[error("rate limited: {message}")]
    RateLimited { message: String },

    /// 5xx server-side failure
    #[error("server error: {message}")]
    ServerError { message: String },

    /// Any other non-success status
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The response was well-formed HTTP but not what the API contract promises
    /// (e.g. a mutating call without an `x-ms-request-id` header)
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Client could not be constructed from the given settings
    #[error("invalid client configuration: {0}")]
    InvalidConfiguration(String),

    /// Response body was not the expected XML document
    #[error("failed to parse XML response: {0}")]
    XmlParse(#[from] quick_xml::DeError),

    /// Request document could not be serialized
    #[error("failed to serialize XML request: {0}")]
    XmlSerialize(#[from] quick_xml::SeError),
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, AsmError>;

/// Error document returned by the management API on failure
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Map a non-success HTTP response to a typed error.
///
/// The body, when parseable, is the ASM `<Error>` document; otherwise the
/// raw body (or the bare status) becomes the message.
pub(crate) fn from_response(status: reqwest::StatusCode, body: &str) -> AsmError {
    let message = match quick_xml::de::from_str::<ErrorBody>(body) {
        Ok(parsed) => match (parsed.code, parsed.message) {
            (Some(code), Some(message)) => format!("{}: {}", code, message),
            (Some(code), None) => code,
            (None, Some(message)) => message,
            (None, None) => status.to_string(),
        },
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => status.to_string(),
    };

    match status.as_u16() {
        400 => AsmError::BadRequest { message },
        401 | 403 => AsmError::AuthenticationFailed { message },
        404 => AsmError::NotFound { message },
        409 => AsmError::Conflict { message },
        429 => AsmError::RateLimited { message },
        500..=599 => AsmError::ServerError { message },
        status => AsmError::ApiError { status, message },
    }
}

impl AsmError {
    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, AsmError::NotFound { .. })
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AsmError::AuthenticationFailed { .. })
    }

    /// Returns true if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        match self {
            AsmError::ServerError { .. } => true,
            AsmError::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns true if this is a request timeout at the transport layer
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, AsmError::Connection(e) if e.is_timeout())
    }

    /// Returns true if this is a rate limiting error (429)
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AsmError::RateLimited { .. })
    }

    /// Returns true if this is a conflict error (409)
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, AsmError::Conflict { .. })
    }

    /// Returns true if this is a bad request error (400)
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        matches!(self, AsmError::BadRequest { .. })
    }

    /// Returns true if the request never reached the API (network failure).
    ///
    /// Distinct from API-level errors: a connection error says nothing about
    /// the state of the remote operation, so pollers treat it as "no answer
    /// yet" rather than a terminal failure.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, AsmError::Connection(_))
    }

    /// Returns true if this error is potentially retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.is_connection() || self.is_server_error() || self.is_rate_limited()
    }
}
