use crate::error::ApiError;
use thiserror::Error;

/// Errors raised while turning a parsed admin command into api calls.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unsupported action: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}
