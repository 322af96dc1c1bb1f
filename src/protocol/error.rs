//! Error types for gateway operations

use std::{fmt, time::Duration};

use thiserror::Error;

use super::jsonrpc::{code, JsonRpcError};

/// Main error type for request handling
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The body could not be parsed as JSON at all
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Malformed JSON-RPC envelope (bad version, missing id/method/params)
    #[error("Invalid request: {0}")]
    RequestValidation(String),

    /// The method is not one this gateway serves
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// The provider call failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl GatewayError {
    /// JSON-RPC error object reported to the caller
    pub fn to_rpc_error(&self) -> JsonRpcError {
        match self {
            GatewayError::Parse(_) => JsonRpcError::parse_error(),
            GatewayError::RequestValidation(_) => JsonRpcError::invalid_request(),
            GatewayError::MethodNotFound(_) => JsonRpcError::method_not_found(),
            GatewayError::Provider(_) => JsonRpcError::provider_failure(),
        }
    }

    /// HTTP status the error travels with
    ///
    /// Envelope problems are the caller's fault (400); business failures are
    /// still a well-formed JSON-RPC exchange (200).
    pub fn http_status(&self) -> u16 {
        match self.to_rpc_error().code {
            code::PARSE_ERROR | code::INVALID_REQUEST | code::METHOD_NOT_FOUND => 400,
            _ => 200,
        }
    }
}

/// Classification of provider failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorKind {
    /// The backend answered with a non-success HTTP status
    UpstreamFailure,

    /// The call never produced a response (timeout, DNS, connection reset)
    TransportFailure,

    /// The backend answered 2xx but the body carried no usable completion
    MalformedResponse,

    /// No provider is registered under the requested identifier
    NotConfigured,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderErrorKind::UpstreamFailure => "upstream failure",
            ProviderErrorKind::TransportFailure => "transport failure",
            ProviderErrorKind::MalformedResponse => "malformed response",
            ProviderErrorKind::NotConfigured => "provider not configured",
        };
        f.write_str(name)
    }
}

/// Provider call error with structured information
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ProviderError {
    /// What went wrong
    pub kind: ProviderErrorKind,

    /// Upstream HTTP status, when there was one
    pub status: Option<u16>,

    /// Human-readable detail, for logs only
    pub message: String,
}

impl ProviderError {
    /// Create a new provider error
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    /// Non-success HTTP status from the backend
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::UpstreamFailure,
            status: Some(status),
            message: message.into(),
        }
    }

    /// Network-level failure
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::TransportFailure, message)
    }

    /// The call did not finish within `timeout`
    pub fn timeout(timeout: Duration) -> Self {
        Self::transport(format!("request timed out after {}ms", timeout.as_millis()))
    }

    /// 2xx body without a completion
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::MalformedResponse, message)
    }

    /// Unknown provider identifier
    pub fn not_configured(identifier: &str) -> Self {
        Self::new(
            ProviderErrorKind::NotConfigured,
            format!("no provider registered as '{identifier}'"),
        )
    }

    /// Check if this error came from an upstream status code
    pub fn is_upstream(&self) -> bool {
        self.kind == ProviderErrorKind::UpstreamFailure
    }

    /// Check if this error is a network-level failure
    pub fn is_transport(&self) -> bool {
        self.kind == ProviderErrorKind::TransportFailure
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::transport(format!("Request timeout: {}", err))
        } else if err.is_connect() {
            ProviderError::transport(format!("Connection error: {}", err))
        } else if let Some(status) = err.status() {
            ProviderError::upstream(status.as_u16(), err.to_string())
        } else {
            ProviderError::transport(err.to_string())
        }
    }
}
