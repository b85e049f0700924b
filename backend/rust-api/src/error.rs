use axum::http::StatusCode;

/// Error kinds produced by the progress engine.
///
/// `NotFound` and `Validation` are surfaced to API callers on the submission
/// path. `Conflict` and `Timeout` are internal: optimistic-write conflicts are
/// retried with backoff, and batch lookup timeouts are converted into default
/// zero-progress entries before a response is built.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("concurrent update conflict")]
    Conflict,

    #[error("lookup timed out")]
    Timeout,
}

impl EngineError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// HTTP status for errors that reach a handler. Conflict and Timeout only
    /// get here if internal retries/fallbacks were exhausted, which counts as
    /// a server-side failure.
    pub fn status(&self) -> StatusCode {
        match self {
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            EngineError::Conflict => StatusCode::INTERNAL_SERVER_ERROR,
            EngineError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}
