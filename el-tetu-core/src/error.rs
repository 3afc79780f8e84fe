//! Unified fetch error type

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Message shown when a failure carries nothing displayable.
pub const FALLBACK_MESSAGE: &str = "Error al cargar datos";

/// Error-body fields consulted by paginated fetches, in priority order.
pub const PAGINATED_MESSAGE_FIELDS: &[&str] = &["error", "detail"];

/// Error-body fields consulted by single-resource fetches.
pub const SINGLE_MESSAGE_FIELDS: &[&str] = &["error"];

/// Failure reported by a data source.
///
/// Controllers never propagate this to the caller's stack: it is stored as a
/// display message in the controller state and forwarded verbatim to the
/// `on_error` handler.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum FetchError {
    /// Connection-level failure (refused, DNS resolution, TLS, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// The transport gave up waiting for a response
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The server answered with a non-success status
    #[error("Request failed with status code {status}")]
    Status {
        status: u16,
        /// Parsed JSON error body, when the server sent one
        body: Option<Value>,
    },

    /// The response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Failure raised by a caller-supplied source, already user-facing
    #[error("{0}")]
    Message(String),
}

impl FetchError {
    /// Build a [`FetchError::Status`] from a status code and optional body.
    pub fn status(status: u16, body: Option<Value>) -> Self {
        Self::Status { status, body }
    }

    /// Structured error body, if the server sent one.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Status { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// HTTP status code, for status-specific handling in `on_error`.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// First non-empty string among `fields` in the error body.
    pub fn body_message(&self, fields: &[&str]) -> Option<String> {
        let body = self.body()?;
        fields.iter().find_map(|field| {
            body.get(*field)
                .and_then(Value::as_str)
                .filter(|msg| !msg.trim().is_empty())
                .map(str::to_string)
        })
    }

    /// The error's own user-facing message.
    ///
    /// Transport failures (network, timeout, decode) have none and
    /// fall back to [`FALLBACK_MESSAGE`].
    fn own_message(&self) -> Option<String> {
        match self {
            Self::Status { .. } => Some(self.to_string()),
            Self::Message(msg) if !msg.trim().is_empty() => Some(msg.clone()),
            _ => None,
        }
    }

    /// Human-readable message for display.
    ///
    /// Priority: body fields in `fields` order, then the error's own message,
    /// then [`FALLBACK_MESSAGE`].
    pub fn display_message(&self, fields: &[&str]) -> String {
        self.body_message(fields)
            .or_else(|| self.own_message())
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string())
    }

    /// Whether it is expected behavior (client-side rejection, caller message),
    /// used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error`
    /// when returning `false`.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::Status { status, .. } => (400..500).contains(status),
            Self::Message(_) => true,
            Self::Network(_) | Self::Timeout(_) | Self::Parse(_) => false,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Core layer Result type alias
pub type FetchResult<T> = std::result::Result<T, FetchError>;
