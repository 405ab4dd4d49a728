//! In-memory [`ComputePlatform`] for tests and local runs.
//!
//! Transitions follow the platform's observable behavior: `start` on a
//! stopped instance moves it to `pending`, `stop` on a running or pending
//! instance moves it to `stopping`. Repeating a transition that is already
//! underway or complete is accepted as a no-op. Anything else is refused
//! with [`ComputeError::IncorrectState`]. Transitional states stay put
//! until [`MemoryComputePlatform::settle`] completes them.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{
    error::{ComputeError, ComputeResult},
    platform::ComputePlatform,
    state::InstanceState,
};

/// In-memory compute platform holding any number of instances.
///
/// # Examples
///
/// ```
/// use servergate_compute::{ComputePlatform, InstanceState, MemoryComputePlatform};
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let platform = MemoryComputePlatform::new();
/// platform.insert_instance("i-0abc", InstanceState::Stopped);
///
/// platform.start_instance("i-0abc").await.unwrap();
/// assert_eq!(platform.describe_state("i-0abc").await.unwrap(), InstanceState::Pending);
///
/// platform.settle();
/// assert_eq!(platform.describe_state("i-0abc").await.unwrap(), InstanceState::Running);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryComputePlatform {
    instances: RwLock<HashMap<String, InstanceState>>,
    failure: RwLock<Option<ComputeError>>,
    describes: AtomicU64,
    starts: AtomicU64,
    stops: AtomicU64,
}

impl MemoryComputePlatform {
    /// Creates a platform with no instances.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a platform holding a single instance.
    #[must_use]
    pub fn with_instance(instance_id: impl Into<String>, state: InstanceState) -> Self {
        let platform = Self::new();
        platform.insert_instance(instance_id, state);
        platform
    }

    /// Inserts an instance or overwrites its state.
    pub fn insert_instance(&self, instance_id: impl Into<String>, state: InstanceState) {
        self.instances.write().insert(instance_id.into(), state);
    }

    /// Returns the stored state without counting as a platform call.
    #[must_use]
    pub fn state_of(&self, instance_id: &str) -> Option<InstanceState> {
        self.instances.read().get(instance_id).cloned()
    }

    /// Makes every call fail with `error` until cleared with `None`.
    pub fn set_failure(&self, error: Option<ComputeError>) {
        *self.failure.write() = error;
    }

    /// Completes every in-flight transition.
    ///
    /// `pending` becomes `running`, `stopping` becomes `stopped` and
    /// `shutting-down` becomes `terminated`.
    pub fn settle(&self) {
        for state in self.instances.write().values_mut() {
            let settled = match state {
                InstanceState::Pending => InstanceState::Running,
                InstanceState::Stopping => InstanceState::Stopped,
                InstanceState::ShuttingDown => InstanceState::Terminated,
                _ => continue,
            };
            *state = settled;
        }
    }

    /// Number of `describe_state` calls so far.
    #[must_use]
    pub fn describe_count(&self) -> u64 {
        self.describes.load(Ordering::Relaxed)
    }

    /// Number of `start_instance` calls so far.
    #[must_use]
    pub fn start_count(&self) -> u64 {
        self.starts.load(Ordering::Relaxed)
    }

    /// Number of `stop_instance` calls so far.
    #[must_use]
    pub fn stop_count(&self) -> u64 {
        self.stops.load(Ordering::Relaxed)
    }

    /// Total number of platform calls of any kind.
    #[must_use]
    pub fn call_count(&self) -> u64 {
        self.describe_count() + self.start_count() + self.stop_count()
    }

    fn check_failure(&self) -> ComputeResult<()> {
        match self.failure.read().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn transition(
        &self,
        instance_id: &str,
        next: impl FnOnce(&InstanceState) -> Option<Option<InstanceState>>,
    ) -> ComputeResult<()> {
        let mut instances = self.instances.write();
        let state = instances
            .get_mut(instance_id)
            .ok_or_else(|| ComputeError::instance_not_found(instance_id))?;
        match next(state) {
            Some(Some(target)) => {
                tracing::debug!(instance_id, from = %state, to = %target, "Instance transition");
                *state = target;
                Ok(())
            },
            Some(None) => Ok(()),
            None => Err(ComputeError::incorrect_state(instance_id, state.as_str())),
        }
    }
}

#[async_trait]
impl ComputePlatform for MemoryComputePlatform {
    #[tracing::instrument(skip(self))]
    async fn describe_state(&self, instance_id: &str) -> ComputeResult<InstanceState> {
        self.describes.fetch_add(1, Ordering::Relaxed);
        self.check_failure()?;
        self.state_of(instance_id).ok_or_else(|| ComputeError::instance_not_found(instance_id))
    }

    #[tracing::instrument(skip(self))]
    async fn start_instance(&self, instance_id: &str) -> ComputeResult<()> {
        self.starts.fetch_add(1, Ordering::Relaxed);
        self.check_failure()?;
        self.transition(instance_id, |state| match state {
            InstanceState::Stopped => Some(Some(InstanceState::Pending)),
            InstanceState::Pending | InstanceState::Running => Some(None),
            _ => None,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn stop_instance(&self, instance_id: &str) -> ComputeResult<()> {
        self.stops.fetch_add(1, Ordering::Relaxed);
        self.check_failure()?;
        self.transition(instance_id, |state| match state {
            InstanceState::Running | InstanceState::Pending => Some(Some(InstanceState::Stopping)),
            InstanceState::Stopping | InstanceState::Stopped => Some(None),
            _ => None,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use rstest::rstest;

    use super::*;

    const ID: &str = "i-0123456789abcdef0";

    #[tokio::test]
    async fn test_start_then_settle() {
        let platform = MemoryComputePlatform::with_instance(ID, InstanceState::Stopped);
        platform.start_instance(ID).await.unwrap();
        assert_eq!(platform.state_of(ID), Some(InstanceState::Pending));
        platform.settle();
        assert_eq!(platform.state_of(ID), Some(InstanceState::Running));
        assert_eq!(platform.start_count(), 1);
    }

    #[tokio::test]
    async fn test_stop_then_settle() {
        let platform = MemoryComputePlatform::with_instance(ID, InstanceState::Running);
        platform.stop_instance(ID).await.unwrap();
        assert_eq!(platform.state_of(ID), Some(InstanceState::Stopping));
        platform.settle();
        assert_eq!(platform.state_of(ID), Some(InstanceState::Stopped));
    }

    #[rstest]
    #[case(InstanceState::Terminated)]
    #[case(InstanceState::ShuttingDown)]
    #[case(InstanceState::Stopping)]
    #[tokio::test]
    async fn test_start_refused(#[case] state: InstanceState) {
        let platform = MemoryComputePlatform::with_instance(ID, state.clone());
        let err = platform.start_instance(ID).await.unwrap_err();
        assert!(matches!(err, ComputeError::IncorrectState { .. }));
        assert_eq!(platform.state_of(ID), Some(state));
    }

    #[tokio::test]
    async fn test_repeated_start_is_noop() {
        let platform = MemoryComputePlatform::with_instance(ID, InstanceState::Running);
        platform.start_instance(ID).await.unwrap();
        assert_eq!(platform.state_of(ID), Some(InstanceState::Running));
    }

    #[tokio::test]
    async fn test_unknown_instance() {
        let platform = MemoryComputePlatform::new();
        let err = platform.describe_state(ID).await.unwrap_err();
        assert!(matches!(err, ComputeError::InstanceNotFound { .. }));
    }

    #[tokio::test]
    async fn test_injected_failure_counts_call() {
        let platform = MemoryComputePlatform::with_instance(ID, InstanceState::Running);
        platform.set_failure(Some(ComputeError::Timeout));
        assert!(matches!(platform.describe_state(ID).await, Err(ComputeError::Timeout)));
        assert!(matches!(platform.stop_instance(ID).await, Err(ComputeError::Timeout)));
        assert_eq!(platform.call_count(), 2);
        assert_eq!(platform.state_of(ID), Some(InstanceState::Running));

        platform.set_failure(None);
        assert_eq!(platform.describe_state(ID).await.unwrap(), InstanceState::Running);
    }

    #[test]
    fn test_settle_leaves_stable_states() {
        let platform = MemoryComputePlatform::new();
        platform.insert_instance("a", InstanceState::Running);
        platform.insert_instance("b", InstanceState::Other("hibernating".into()));
        platform.insert_instance("c", InstanceState::ShuttingDown);
        platform.settle();
        assert_eq!(platform.state_of("a"), Some(InstanceState::Running));
        assert_eq!(platform.state_of("b"), Some(InstanceState::Other("hibernating".into())));
        assert_eq!(platform.state_of("c"), Some(InstanceState::Terminated));
    }
}
