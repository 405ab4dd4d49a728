//! Configuration errors.

use thiserror::Error;

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while building or reading a [`DeploymentConfig`](crate::DeploymentConfig).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required setting is absent.
    #[error("{setting} is not set")]
    Missing {
        /// Name of the setting (environment variable name where applicable).
        setting: String,
    },

    /// A setting is present but unusable.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Creates a [`ConfigError::Missing`].
    #[must_use]
    pub fn missing(setting: impl Into<String>) -> Self {
        Self::Missing { setting: setting.into() }
    }

    /// Creates a [`ConfigError::Invalid`].
    #[must_use]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid { field: field.into(), reason: reason.into() }
    }
}
