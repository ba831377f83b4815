//! Error types for the Bybit client library.

use thiserror::Error;

/// The main error type for all Bybit client operations.
#[derive(Error, Debug)]
pub enum BybitError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP request with middleware failed
    #[error("HTTP request failed: {0}")]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    /// WebSocket protocol error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Bybit API returned a non-zero `retCode`
    #[error("Bybit API error: {0}")]
    Api(ApiError),

    /// Rate limit exceeded (`retCode` 10006)
    #[error("Rate limit exceeded{}", match retry_after_ms {
        Some(ms) => format!(", retry after {ms}ms"),
        None => String::new(),
    })]
    RateLimitExceeded {
        /// Suggested wait time in milliseconds before retrying
        retry_after_ms: Option<u64>,
    },

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Invalid response from the API
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Topic string is not a valid Bybit stream topic
    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    /// Operation on a session that has been closed
    #[error("Session is closed")]
    SessionClosed,

    /// Requested stream endpoint is not available on the selected network
    #[error("Unsupported endpoint: {0}")]
    UnsupportedEndpoint(String),

    /// Missing required credentials
    #[error("Missing credentials: API key and secret required for private endpoints")]
    MissingCredentials,
}

/// Bybit API error returned in the response envelope.
///
/// Every v5 response carries `retCode`/`retMsg`; any non-zero code is an
/// error even when the HTTP status is 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The numeric return code from Bybit (e.g., 10004)
    pub code: i64,
    /// Human-readable error message (`retMsg`)
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl ApiError {
    /// Create a new API error from code and message.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limited(&self) -> bool {
        self.code == ret_codes::RATE_LIMIT_EXCEEDED
    }

    /// Check if this is an authentication problem (bad key, bad signature,
    /// missing permission, expired key).
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self.code,
            ret_codes::INVALID_API_KEY
                | ret_codes::INVALID_SIGNATURE
                | ret_codes::PERMISSION_DENIED
                | ret_codes::API_KEY_EXPIRED
        )
    }

    /// Check if this is a timestamp/recv_window error (local clock outside
    /// the server's accepted window).
    pub fn is_timestamp_error(&self) -> bool {
        self.code == ret_codes::INVALID_TIMESTAMP
    }

    /// Check if this is a server-side error worth retrying.
    pub fn is_server_error(&self) -> bool {
        self.code == ret_codes::SERVER_ERROR
    }
}

/// Known Bybit v5 return codes for pattern matching.
pub mod ret_codes {
    /// Success
    pub const OK: i64 = 0;

    /// Request parameter error
    pub const PARAMS_ERROR: i64 = 10001;
    /// Request timestamp outside of the recv_window
    pub const INVALID_TIMESTAMP: i64 = 10002;
    /// API key invalid
    pub const INVALID_API_KEY: i64 = 10003;
    /// Signature verification failed
    pub const INVALID_SIGNATURE: i64 = 10004;
    /// Permission denied for this API key
    pub const PERMISSION_DENIED: i64 = 10005;
    /// Too many visits (rate limited)
    pub const RATE_LIMIT_EXCEEDED: i64 = 10006;
    /// Request IP not in the key's whitelist
    pub const IP_MISMATCH: i64 = 10010;
    /// Internal server error
    pub const SERVER_ERROR: i64 = 10016;
    /// API key expired
    pub const API_KEY_EXPIRED: i64 = 33004;

    /// Order does not exist
    pub const ORDER_NOT_FOUND: i64 = 110001;
    /// Insufficient available balance
    pub const INSUFFICIENT_BALANCE: i64 = 110007;
    /// Leverage not modified
    pub const LEVERAGE_NOT_MODIFIED: i64 = 110043;
}

/// Errors raised by the WebSocket transport layer.
///
/// These never cross the public API: the session state machine consumes them
/// and reacts by reconnecting. They are public only so custom [`Transport`]
/// implementations (e.g. test doubles) can produce them.
///
/// [`Transport`]: crate::ws::Transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Establishing the physical connection failed (DNS, TLS, refused)
    #[error("connect failed: {0}")]
    Connect(String),

    /// The connection dropped while sending a frame
    #[error("send failed: {0}")]
    Send(String),

    /// An I/O or protocol error occurred while receiving
    #[error("receive failed: {0}")]
    Receive(String),

    /// The peer closed the connection
    #[error("connection closed: {}", reason.as_deref().unwrap_or("no close frame"))]
    Closed {
        /// Close reason, when the peer sent a close frame
        reason: Option<String>,
    },
}

impl TransportError {
    /// Closed-connection error without a close frame.
    pub fn closed() -> Self {
        Self::Closed { reason: None }
    }

    /// Closed-connection error with the peer's close reason.
    pub fn closed_with_reason(reason: impl Into<String>) -> Self {
        Self::Closed {
            reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_classification() {
        let error = ApiError::new(ret_codes::INVALID_SIGNATURE, "error sign!");
        assert!(error.is_auth_error());
        assert!(!error.is_rate_limited());

        let error = ApiError::new(ret_codes::RATE_LIMIT_EXCEEDED, "Too many visits!");
        assert!(error.is_rate_limited());
        assert!(!error.is_auth_error());
    }

    #[test]
    fn test_api_error_display() {
        let error = ApiError::new(110007, "ab not enough for new order");
        assert_eq!(error.to_string(), "110007: ab not enough for new order");
    }

    #[test]
    fn test_transport_error_closed_display() {
        assert_eq!(
            TransportError::closed().to_string(),
            "connection closed: no close frame"
        );
        assert_eq!(
            TransportError::closed_with_reason("going away").to_string(),
            "connection closed: going away"
        );
    }
}
