//! Error handling for fetchkit

use std::fmt;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use crate::http::request::Request;

/// Main error type for fetchkit operations
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FetchError {
    /// Caller input rejected before any network I/O. These are never retried.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            FetchError::Config(_) | FetchError::InvalidUrl(_) | FetchError::InvalidHeader(_)
        )
    }

    /// The request error, if this failure was classified as one.
    pub fn as_request_error(&self) -> Option<&RequestError> {
        match self {
            FetchError::Request(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for fetchkit operations
pub type Result<T> = std::result::Result<T, FetchError>;

/// How a request failed after it was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestErrorKind {
    /// A response arrived with a non-success status.
    Status(StatusCode),
    /// No response within the configured timeout, in milliseconds.
    Timeout(u64),
    /// The caller's cancellation token fired.
    Aborted,
}

/// What was received from the server when a request failed on status.
#[derive(Debug, Clone)]
pub struct ResponseInfo {
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// A failed request, distinguishable from a generic transport fault.
///
/// Carries the request that failed and, for status failures, the response
/// that was received, so callers can diagnose without inspecting internals.
#[derive(Error)]
#[error("{message}")]
pub struct RequestError {
    message: String,
    kind: RequestErrorKind,
    request: Request,
    response: Option<ResponseInfo>,
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl RequestError {
    pub(crate) fn from_status(request: Request, response: ResponseInfo) -> Self {
        let status = response.status;
        let message = if status.is_server_error() {
            format!(
                "Request to {} failed with status {}: possibly a transient network fluctuation, \
                 contact the maintainer if it persists",
                request.url(),
                status.as_u16()
            )
        } else {
            format!(
                "Request to {} failed with status code {}",
                request.url(),
                status.as_u16()
            )
        };
        Self {
            message,
            kind: RequestErrorKind::Status(status),
            request,
            response: Some(response),
            cause: None,
        }
    }

    pub(crate) fn timeout(request: Request, timeout_ms: u64) -> Self {
        Self {
            message: format!(
                "Request to {} timed out after {} ms",
                request.url(),
                timeout_ms
            ),
            kind: RequestErrorKind::Timeout(timeout_ms),
            request,
            response: None,
            cause: None,
        }
    }

    pub(crate) fn aborted(request: Request) -> Self {
        Self {
            message: format!("Request to {} was cancelled", request.url()),
            kind: RequestErrorKind::Aborted,
            request,
            response: None,
            cause: None,
        }
    }

    pub(crate) fn with_cause(
        mut self,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> RequestErrorKind {
        self.kind
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The response received, if the failure was an HTTP status failure.
    pub fn response(&self) -> Option<&ResponseInfo> {
        self.response.as_ref()
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self.kind {
            RequestErrorKind::Status(status) => Some(status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, RequestErrorKind::Timeout(_))
    }
}

impl fmt::Debug for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestError")
            .field("message", &self.message)
            .field("kind", &self.kind)
            .field("url", &self.request.url().as_str())
            .field("method", self.request.method())
            .field("response", &self.response.as_ref().map(|r| r.status))
            .field("cause", &self.cause)
            .finish()
    }
}
