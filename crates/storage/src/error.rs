//! Storage error types and result alias.
//!
//! Every [`ParameterStore`](crate::ParameterStore) implementation maps its
//! transport errors onto these variants so callers can tell "the secret does
//! not exist" from "the store could not be reached".
//!
//! # Error Types
//!
//! - [`StorageError::NotFound`] - Parameter does not exist
//! - [`StorageError::AccessDenied`] - Caller may not read (or decrypt) the parameter
//! - [`StorageError::Connection`] - Network or connection-related failures
//! - [`StorageError::Internal`] - Backend-specific internal errors
//! - [`StorageError::Timeout`] - Operation exceeded time limit
//!
//! # Example
//!
//! ```
//! use servergate_storage::{StorageError, StorageResult};
//!
//! fn lookup(name: &str) -> StorageResult<String> {
//!     Err(StorageError::not_found(name))
//! }
//! ```

use std::sync::Arc;

use thiserror::Error;

/// A boxed error type for source chain tracking.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync>;

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while reading a parameter.
///
/// Errors preserve their source chain via the `#[source]` attribute.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]`. Downstream match expressions
/// must include a wildcard arm (`_ =>`).
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// The requested parameter does not exist.
    #[error("Parameter not found: {name}")]
    NotFound {
        /// The parameter name that was not found.
        name: String,
    },

    /// The caller is not permitted to read or decrypt the parameter.
    #[error("Access denied: {name}")]
    AccessDenied {
        /// The parameter name that was refused.
        name: String,
    },

    /// Connection or network error.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
        /// The underlying error that caused this connection failure.
        #[source]
        source: Option<BoxError>,
    },

    /// Internal storage backend error.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
        /// The underlying error that caused this internal failure.
        #[source]
        source: Option<BoxError>,
    },

    /// Operation timed out.
    #[error("Operation timeout")]
    Timeout,
}

impl StorageError {
    /// Creates a new `NotFound` error for the given parameter name.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Creates a new `AccessDenied` error for the given parameter name.
    #[must_use]
    pub fn access_denied(name: impl Into<String>) -> Self {
        Self::AccessDenied { name: name.into() }
    }

    /// Creates a new `Connection` error with the given message.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into(), source: None }
    }

    /// Creates a new `Connection` error with a message and source error.
    #[must_use]
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `Internal` error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Creates a new `Internal` error with a message and source error.
    #[must_use]
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Internal { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `Timeout` error.
    #[must_use]
    pub fn timeout() -> Self {
        Self::Timeout
    }

    /// Returns `true` for faults of the store itself rather than of the
    /// requested parameter.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            StorageError::not_found("/app/jwt/public-key").to_string(),
            "Parameter not found: /app/jwt/public-key"
        );
        assert_eq!(StorageError::access_denied("/x").to_string(), "Access denied: /x");
        assert_eq!(StorageError::connection("refused").to_string(), "Connection error: refused");
        assert_eq!(StorageError::internal("boom").to_string(), "Internal error: boom");
        assert_eq!(StorageError::timeout().to_string(), "Operation timeout");
    }

    #[test]
    fn test_source_chain_preserved() {
        let inner = StorageError::timeout();
        let err = StorageError::connection_with_source("store unreachable", inner);
        let source = err.source().expect("source must be preserved");
        assert_eq!(source.to_string(), "Operation timeout");
    }

    #[test]
    fn test_is_transient() {
        assert!(StorageError::connection("x").is_transient());
        assert!(StorageError::timeout().is_transient());
        assert!(!StorageError::not_found("x").is_transient());
        assert!(!StorageError::access_denied("x").is_transient());
        assert!(!StorageError::internal("x").is_transient());
    }
}
