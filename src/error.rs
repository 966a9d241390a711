use thiserror::Error;

/// Errors returned by engine operations.
///
/// Business rule failures (`NotFound`, `InvalidTransition`, `ValidationFailed`,
/// `Unauthorized`) are expected outcomes the caller presents to the user.
/// `Storage` is the only fault: the owning actor is gone.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} {}", kind, id))
    }

    pub fn invalid_transition(kind: &str, from: impl std::fmt::Debug, action: &str) -> Self {
        Self::InvalidTransition(format!("cannot {} {} in status {:?}", action, kind, from))
    }
}
