//! The compute platform trait.
//!
//! # Implementing a Platform
//!
//! | Method | Semantics |
//! |--------|-----------|
//! | `describe_state` | Current state of the instance, no side effects |
//! | `start_instance` | Request a start, return once accepted |
//! | `stop_instance` | Request a stop, return once accepted |
//!
//! Transitions are fire-and-forget. Callers report the expected
//! transitional state rather than waiting for the platform to settle.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{error::ComputeResult, state::InstanceState};

/// Observes and transitions a single compute instance.
#[async_trait]
pub trait ComputePlatform: Send + Sync {
    /// Returns the instance's current state.
    async fn describe_state(&self, instance_id: &str) -> ComputeResult<InstanceState>;

    /// Requests that the instance be started.
    async fn start_instance(&self, instance_id: &str) -> ComputeResult<()>;

    /// Requests that the instance be stopped.
    async fn stop_instance(&self, instance_id: &str) -> ComputeResult<()>;
}

#[async_trait]
impl<P: ComputePlatform + ?Sized> ComputePlatform for Arc<P> {
    async fn describe_state(&self, instance_id: &str) -> ComputeResult<InstanceState> {
        (**self).describe_state(instance_id).await
    }

    async fn start_instance(&self, instance_id: &str) -> ComputeResult<()> {
        (**self).start_instance(instance_id).await
    }

    async fn stop_instance(&self, instance_id: &str) -> ComputeResult<()> {
        (**self).stop_instance(instance_id).await
    }
}
