//! Error types for the record book service
//!
//! Two layers: `StoreError` is whatever the document store reported, carried
//! with an HTTP-style status code; `RecordError` is the taxonomy handlers work
//! with. Store errors are turned into responses through
//! [`translate_store_error`], everything else through
//! [`RecordError::status_code`].

use hyper::StatusCode;
use mongodb::error::{ErrorKind, WriteFailure};

/// MongoDB duplicate key error code
const DUPLICATE_KEY: i32 = 11000;

/// Opaque failure reported by a repository
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("store error ({status}): {message}")]
pub struct StoreError {
    /// HTTP-style status code describing the failure
    pub status: u16,
    /// Upstream message, kept for logs
    pub message: String,
}

impl StoreError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(409, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(503, message)
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        let status = match err.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY => 409,
            ErrorKind::Command(e) if e.code == DUPLICATE_KEY => 409,
            ErrorKind::ServerSelection { .. } => 503,
            _ => 500,
        };
        Self::new(status, err.to_string())
    }
}

impl From<bson::ser::Error> for StoreError {
    fn from(err: bson::ser::Error) -> Self {
        Self::unexpected(format!("BSON encoding failed: {err}"))
    }
}

/// Map a store error to the status and message sent to the client.
///
/// Total over every `u16`: codes outside the known table keep their status
/// when it is a valid HTTP status, otherwise fall back to 500 with the
/// original code in the message.
pub fn translate_store_error(err: &StoreError) -> (StatusCode, String) {
    match err.status {
        400 => (StatusCode::BAD_REQUEST, "bad request".to_string()),
        401 => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
        403 => (StatusCode::FORBIDDEN, "forbidden".to_string()),
        404 => (StatusCode::NOT_FOUND, "not found".to_string()),
        409 => (StatusCode::CONFLICT, "conflict".to_string()),
        code => match StatusCode::from_u16(code) {
            Ok(status) => (status, "unexpected error".to_string()),
            Err(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("unexpected error (status {code})"),
            ),
        },
    }
}

/// Main error type for record book operations
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Internal(String),
}

impl RecordError {
    pub fn missing_field(name: &str) -> Self {
        Self::Validation(format!("missing required field: {name}"))
    }

    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Store(e) => translate_store_error(e).0,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable code for the error body
    pub fn code(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "BAD_REQUEST",
            StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
            StatusCode::FORBIDDEN => "FORBIDDEN",
            StatusCode::NOT_FOUND => "NOT_FOUND",
            StatusCode::METHOD_NOT_ALLOWED => "METHOD_NOT_ALLOWED",
            StatusCode::CONFLICT => "CONFLICT",
            StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
            StatusCode::BAD_GATEWAY => "UPSTREAM_ERROR",
            StatusCode::SERVICE_UNAVAILABLE => "UNAVAILABLE",
            StatusCode::GATEWAY_TIMEOUT => "TIMEOUT",
            _ => "INTERNAL_ERROR",
        }
    }

    /// Convert to status code and body tuple for HTTP response
    pub fn into_status_code_and_body(self) -> (StatusCode, String) {
        match self {
            Self::Store(ref e) => translate_store_error(e),
            other => (other.status_code(), other.to_string()),
        }
    }
}

impl From<serde_json::Error> for RecordError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(format!("malformed JSON body: {err}"))
    }
}

impl From<jsonwebtoken::errors::Error> for RecordError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Unauthorized(format!("JWT error: {err}"))
    }
}

impl From<reqwest::Error> for RecordError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}

impl From<std::io::Error> for RecordError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Result type alias for record book operations
pub type Result<T> = std::result::Result<T, RecordError>;
