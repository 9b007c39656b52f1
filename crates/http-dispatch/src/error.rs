//! Error types for `rexi-http-dispatch`.

use std::time::Duration;
use thiserror::Error;

/// Per-call failures. None of these are shared between calls.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A `{name}` placeholder in the path template has no value.
    ///
    /// Raised before any network I/O.
    #[error("Missing path parameter: {name}")]
    MissingParameter { name: String },

    /// A path parameter value of `.` or `..`, which would be removed as a dot segment and
    /// redirect the call to a different path. Raised before any network I/O.
    #[error("Invalid value '{value}' for path parameter: {name}")]
    InvalidPathValue { name: String, value: String },

    /// The method is not one of GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS.
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// Timeouts must be positive, finite seconds.
    #[error("Invalid timeout: {0} (expected a positive number of seconds)")]
    InvalidTimeout(f64),

    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Invalid header '{name}': {message}")]
    InvalidHeader { name: String, message: String },

    /// The exchange did not complete within the caller's timeout.
    #[error("Request to {url} timed out after {}ms", timeout.as_millis())]
    Timeout { url: String, timeout: Duration },

    /// Connection, DNS, TLS or body-read failure (URLs redacted).
    #[error("HTTP transport error: {0}")]
    Transport(String),
}

impl DispatchError {
    /// Whether this failure happened on the wire (as opposed to a malformed call).
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Transport(_))
    }
}

/// Result type alias for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
