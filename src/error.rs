//! Error types for the trendwatch client.

/// Top-level error type for the dashboard client.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Talking to the analysis service failed.
    #[error("fetch error: {0}")]
    Fetch(#[from] trendwatch_api::ApiError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Chat exchange error.
    #[error("chat error: {0}")]
    Chat(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, WatchError>;
