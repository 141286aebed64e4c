use thiserror::Error;

/// Application-wide error types for Leadscope.
#[derive(Error, Debug)]
pub enum AppError {
    /// The inbound request is malformed (no URLs, no parseable URL).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The browser session could not be acquired.
    #[error("Failed to initialize browser session: {0}")]
    SessionInit(String),

    /// Page navigation failed (DNS, TLS, refused connection, aborted load).
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// Running a query inside the page failed.
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Any other failure reported by the browser engine.
    #[error("Browser error: {0}")]
    Browser(String),

    /// A bounded browser operation did not finish in time.
    #[error("{operation} timed out after {millis} ms")]
    Timeout { operation: String, millis: u64 },

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    pub fn timeout(operation: &str, duration: std::time::Duration) -> Self {
        AppError::Timeout {
            operation: operation.to_string(),
            millis: duration.as_millis() as u64,
        }
    }
}
