use thiserror::Error;

/// Failures surfaced by [`Logger::log`](crate::Logger::log).
#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to write log record: {0}")]
    Write(#[from] std::io::Error),

    #[error("failed to encode log record: {0}")]
    Encode(#[from] serde_json::Error),
}
