//! Animation error types

use thiserror::Error;

/// Errors raised while interpreting animation parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// Ease name that doesn't match a known curve
    #[error("Unknown ease: {0}")]
    InvalidEase(String),

    /// Scroll threshold that can't be parsed
    #[error("Invalid scroll position: {0}")]
    InvalidScrollPosition(String),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
