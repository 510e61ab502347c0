use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not reach backend: {0}")]
    Transport(String),

    /// Non-success status from the proxy; `message` is its `error` field.
    #[error("Backend error: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("invalid response from backend: {0}")]
    Decode(String),

    #[error("an analysis is already in progress")]
    AlreadyAnalyzing,

    #[error("no history entry with id {0}")]
    UnknownHistoryEntry(i64),
}
