//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur while building or resolving test data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The target base address is not an absolute URL.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The offending base address.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// The request path cannot be resolved against the base address.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// Parser message.
        reason: String,
    },

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
