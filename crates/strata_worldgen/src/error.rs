//! # World Generation Error Types
//!
//! Generation itself is infallible; errors only surface while loading and
//! validating world settings.

use thiserror::Error;

/// Errors that can occur in the world generation crate.
#[derive(Error, Debug)]
pub enum WorldGenError {
    /// Settings parsed but hold a value the generator cannot work with.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Settings file is not valid TOML for `WorldSettings`.
    #[error("failed to parse world settings: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Settings file could not be read.
    #[error("failed to read world settings: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for world generation operations.
pub type WorldGenResult<T> = Result<T, WorldGenError>;
