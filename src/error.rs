//! Error types shared by the HTTP client wrapper and configuration.

/// Errors produced by outbound API calls.
///
/// `Clone` so a single refresh failure can be delivered to every request
/// parked behind it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("network request failed: {0}")]
    Network(String),
    /// The request exceeded its deadline.
    #[error("request timed out")]
    Timeout,
    /// The server answered with a non-2xx status.
    #[error("request failed with status {status}")]
    Status { status: u16, body: String },
    /// A 2xx body could not be decoded into the expected type.
    #[error("response decode failed: {0}")]
    Decode(String),
    /// A request body could not be serialized.
    #[error("request encode failed: {0}")]
    Encode(String),
}

impl ApiError {
    /// Whether this is an authorization failure (HTTP 401).
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }
}

/// Errors produced while parsing client configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("{key} must start with '/': {value}")]
    InvalidRoute { key: &'static str, value: String },
}
