//! Motion error types

use thiserror::Error;

/// Errors surfaced by the preset layer
#[derive(Error, Debug)]
pub enum MotionError {
    /// The host provides no animation engine; nothing can be animated
    #[error("No animation engine available in the host")]
    EngineUnavailable,

    /// Configuration file that isn't valid TOML for `MotionConfig`
    #[error("Invalid motion config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Failed to read motion config: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for motion operations
pub type Result<T> = std::result::Result<T, MotionError>;
