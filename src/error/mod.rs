//! Error Types
//!
//! Error hierarchy for the session manager. Refresh failures are deliberately
//! absent here: a failed refresh becomes a field on the returned
//! [`CredentialRecord`](crate::types::CredentialRecord) rather than an `Err`,
//! so a caller can keep using a stale-but-possibly-valid token.

use std::time::Duration;
use thiserror::Error;

/// Root error type for session manager operations.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    /// Authorization server rejected the request with a non-2xx response.
    /// Carries the raw status and body for diagnostics.
    #[error("Authorization server rejected request: HTTP {status}")]
    Upstream { status: u16, body: String },

    /// The operation requires a credential that is absent. Raised before any
    /// network call is made.
    #[error("No credential available for {operation}")]
    NoCredential { operation: &'static str },
}

impl AuthError {
    /// Get error code for log fields.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "AUTH_CONFIG",
            Self::Transport(_) => "AUTH_TRANSPORT",
            Self::Protocol(_) => "AUTH_PROTOCOL",
            Self::Store(_) => "AUTH_STORE",
            Self::Upstream { .. } => "AUTH_UPSTREAM",
            Self::NoCredential { .. } => "AUTH_NO_CREDENTIAL",
        }
    }

    /// Check if the failure means the principal must sign in again.
    pub fn needs_reauth(&self) -> bool {
        matches!(
            self,
            Self::NoCredential { .. }
                | Self::Upstream {
                    status: 400 | 401 | 403,
                    ..
                }
        )
    }

    /// Build an upstream error from a non-2xx HTTP response.
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            body: body.into(),
        }
    }
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Missing required field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid endpoint URL: {url}")]
    InvalidEndpoint { url: String },
}

/// Network/transport error.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timeout after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("TLS error: {message}")]
    Tls { message: String },
}

/// Protocol/response parsing error.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },

    #[error("Unexpected redirect to: {location}")]
    UnexpectedRedirect { location: String },
}

/// Session store error.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Read failed: {message}")]
    ReadFailed { message: String },

    #[error("Write failed: {message}")]
    WriteFailed { message: String },

    #[error("Delete failed: {message}")]
    DeleteFailed { message: String },
}

/// Result type for session manager operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// OAuth2 error response body (RFC 6749 Section 5.2).
#[derive(Debug, Clone, serde::Deserialize)]
pub struct OAuth2ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error_uri: Option<String>,
}

/// Parse an OAuth2 error response from an HTTP body, if it is one.
pub fn parse_error_response(body: &str) -> Option<OAuth2ErrorResponse> {
    serde_json::from_str(body).ok()
}

/// Human-readable summary of a non-2xx token endpoint response.
pub fn describe_upstream_failure(status: u16, body: &str) -> String {
    match parse_error_response(body) {
        Some(response) => match response.error_description {
            Some(description) => format!("HTTP {status}: {} ({description})", response.error),
            None => format!("HTTP {status}: {}", response.error),
        },
        None => format!("HTTP {status}"),
    }
}
