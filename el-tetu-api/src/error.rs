use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use el_tetu_core::FetchError;

/// Error type for every API client operation.
///
/// # Retryable Errors
///
/// - [`NetworkError`](Self::NetworkError): connectivity issues
/// - [`Unavailable`](Self::Unavailable): HTTP 502/503/504
/// - [`Timeout`](Self::Timeout): request exceeded [`ApiConfig::timeout`](crate::ApiConfig)
/// - [`RateLimited`](Self::RateLimited): HTTP 429
///
/// These are retried with exponential backoff when
/// [`ApiConfig::max_retries`](crate::ApiConfig) is non-zero.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "code")]
pub enum ApiError {
    /// The request never got a response.
    #[error("Network error: {detail}")]
    NetworkError { detail: String },

    /// The request timed out.
    #[error("Request timed out: {detail}")]
    Timeout { detail: String },

    /// HTTP 429.
    #[error("Rate limited (retry after {retry_after:?}s)")]
    RateLimited {
        /// Seconds from the `Retry-After` header, if sent.
        retry_after: Option<u64>,
        body: Option<Value>,
    },

    /// HTTP 502/503/504. `body` holds the JSON error body, when sent.
    #[error("Request failed with status code {status}")]
    Unavailable { status: u16, body: Option<Value> },

    /// Any other non-success status. `body` holds the JSON error body
    /// (`{"error": ...}` or `{"detail": ...}`), when the server sent one.
    #[error("Request failed with status code {status}")]
    Http { status: u16, body: Option<Value> },

    /// The response body did not match the expected shape.
    #[error("Parse error: {detail}")]
    ParseError { detail: String },

    /// The request body could not be encoded, or the client could not be built.
    #[error("Client error: {detail}")]
    ClientError { detail: String },
}

impl ApiError {
    pub(crate) fn http(status: u16, text: &str) -> Self {
        Self::Http {
            status,
            body: serde_json::from_str(text).ok(),
        }
    }

    pub(crate) fn unavailable(status: u16, text: &str) -> Self {
        Self::Unavailable {
            status,
            body: serde_json::from_str(text).ok(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::Unavailable { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// The server rejected the credentials (HTTP 401).
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Whether it is expected behavior (rejected input, missing resource,
    /// expired session), used for log classification.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::Http { status, .. } => (400..500).contains(status),
            Self::RateLimited { .. } => true,
            _ => false,
        }
    }

    /// Transient failures worth another attempt.
    pub(crate) fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. }
                | Self::Timeout { .. }
                | Self::Unavailable { .. }
                | Self::RateLimited { .. }
        )
    }
}

impl From<ApiError> for FetchError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::NetworkError { detail } => Self::Network(detail),
            ApiError::Timeout { detail } => Self::Timeout(detail),
            ApiError::RateLimited { body, .. } => Self::status(429, body),
            ApiError::Http { status, body } | ApiError::Unavailable { status, body } => {
                Self::status(status, body)
            }
            ApiError::ParseError { detail } | ApiError::ClientError { detail } => {
                Self::Parse(detail)
            }
        }
    }
}

/// API client Result type alias
pub type ApiResult<T> = std::result::Result<T, ApiError>;
