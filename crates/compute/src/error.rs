//! Compute platform error types.

use thiserror::Error;

/// Result type alias for platform operations.
pub type ComputeResult<T> = Result<T, ComputeError>;

/// Errors reported by a [`ComputePlatform`](crate::ComputePlatform).
///
/// # Non-exhaustive
///
/// Downstream match expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ComputeError {
    /// The platform has no instance with this identifier.
    #[error("Instance not found: {instance_id}")]
    InstanceNotFound {
        /// The identifier that was looked up.
        instance_id: String,
    },

    /// The platform refused the transition for the instance's current state.
    #[error("Instance {instance_id} cannot transition from state {state}")]
    IncorrectState {
        /// The instance identifier.
        instance_id: String,
        /// The state the platform reported.
        state: String,
    },

    /// Any other platform fault (throttling, authorization, transport).
    #[error("Platform error: {message}")]
    Platform {
        /// Description of the fault.
        message: String,
    },

    /// The platform call exceeded its time limit.
    #[error("Platform operation timeout")]
    Timeout,
}

impl ComputeError {
    /// Creates a new `InstanceNotFound` error.
    #[must_use]
    pub fn instance_not_found(instance_id: impl Into<String>) -> Self {
        Self::InstanceNotFound { instance_id: instance_id.into() }
    }

    /// Creates a new `IncorrectState` error.
    #[must_use]
    pub fn incorrect_state(instance_id: impl Into<String>, state: impl Into<String>) -> Self {
        Self::IncorrectState { instance_id: instance_id.into(), state: state.into() }
    }

    /// Creates a new `Platform` error with the given message.
    #[must_use]
    pub fn platform(message: impl Into<String>) -> Self {
        Self::Platform { message: message.into() }
    }
}
