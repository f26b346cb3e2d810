use thiserror::Error;

/// Errors reported by the exchange engine. Every operation fails
/// synchronously with one of these; retrying is the caller's decision.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("not allowed: {0}")]
    Authorization(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid state: {0}")]
    State(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),
}
