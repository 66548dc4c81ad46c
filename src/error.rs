//! Crate error types

use thiserror::Error;

/// Errors from monitor configuration and snapshot persistence
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid patience: {0} (must be >= 1)")]
    InvalidPatience(usize),

    #[error("Invalid tolerance: {0} (must be finite and >= 0.0)")]
    InvalidTolerance(f32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

/// Result type for monitor operations
pub type Result<T> = std::result::Result<T, Error>;
