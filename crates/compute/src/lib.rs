//! Compute-platform collaborator contract for servergate.
//!
//! The lifecycle controller never talks to a provider SDK directly. It
//! observes and transitions the managed instance through the
//! [`ComputePlatform`] trait, keyed by an opaque instance identifier.
//! Transitions are fire-and-forget: `start_instance` and `stop_instance`
//! return once the platform has accepted the request.
//!
//! | Backend | Use Case |
//! |---------|----------|
//! | [`MemoryComputePlatform`] | Tests, local runs |
//! | host-provided adapter | Production |

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Compute platform error types.
pub mod error;
/// In-memory platform.
pub mod memory;
/// The platform trait.
pub mod platform;
/// Observed instance states.
pub mod state;

pub use error::{ComputeError, ComputeResult};
pub use memory::MemoryComputePlatform;
pub use platform::ComputePlatform;
pub use state::InstanceState;
