//! Error types shared across the adlens crates.

use thiserror::Error;

/// Unified error type for the engine.
#[derive(Debug, Error)]
pub enum AdlensError {
    /// Caller-supplied input is out of contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Override text failed validation. The message is the user-facing text.
    #[error("{0}")]
    Validation(String),

    /// Internal invariant violated.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl AdlensError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }
}

pub type AdlensResult<T> = Result<T, AdlensError>;
