//! Error types for the trendwatch-api crate.
//!
//! Messages are stable and safe to show to users. They never include
//! response bodies.

/// Errors that can occur while talking to the analysis service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request could not be sent or the connection failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The service answered with a non-success status code.
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        /// Endpoint path, e.g. `/api/results`.
        endpoint: &'static str,
        /// HTTP status code.
        status: u16,
    },

    /// The response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for trendwatch-api results.
pub type Result<T> = std::result::Result<T, ApiError>;
