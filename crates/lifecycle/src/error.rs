//! Lifecycle error types.
//!
//! Each variant maps to exactly one HTTP status code through
//! [`LifecycleError::status_code`]. The `Display` text is the `error` field
//! of the response body.

use servergate_compute::{ComputeError, InstanceState};
use thiserror::Error;

use crate::request::Action;

/// Errors produced while handling a lifecycle request.
///
/// # Non-exhaustive
///
/// Downstream match expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LifecycleError {
    /// No managed instance is configured.
    #[error("INSTANCE_ID environment variable not set")]
    MissingInstanceId,

    /// The request body could not be read as a JSON object. This is an
    /// internal fault; the message carries the parse failure.
    #[error("{reason}")]
    InvalidRequestBody {
        /// Why the body was unreadable.
        reason: String,
    },

    /// The action is absent or not one of the supported three.
    #[error("Invalid action. Must be start, stop, or status")]
    InvalidAction,

    /// The admin token is missing or does not match.
    #[error("Unauthorized")]
    Unauthorized,

    /// The instance is not in the state the action requires.
    #[error("Cannot {action} server in state {state}")]
    ConflictingState {
        /// The requested action.
        action: Action,
        /// The state the platform reported.
        state: InstanceState,
    },

    /// The compute platform failed.
    #[error("{0}")]
    Platform(#[from] ComputeError),
}

impl LifecycleError {
    /// Create an [`InvalidRequestBody`](Self::InvalidRequestBody) error.
    #[must_use]
    pub fn invalid_request_body(reason: impl Into<String>) -> Self {
        Self::InvalidRequestBody { reason: reason.into() }
    }

    /// HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAction | Self::ConflictingState { .. } => 400,
            Self::Unauthorized => 403,
            Self::MissingInstanceId | Self::InvalidRequestBody { .. } | Self::Platform(_) => 500,
        }
    }
}

/// Result type alias for lifecycle operations.
pub type Result<T> = std::result::Result<T, LifecycleError>;
