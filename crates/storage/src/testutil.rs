//! Shared test utilities for code that talks to secret storage.
//!
//! Feature-gated behind `testutil`:
//!
//! ```toml
//! [dev-dependencies]
//! servergate-storage = { path = "../storage", features = ["testutil"] }
//! ```

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    audit::{AuditEvent, AuditLogger},
    store::MemoryParameterStore,
};

/// Creates a [`MemoryParameterStore`] holding the given `(name, value)` pairs.
#[must_use]
pub fn store_with(parameters: &[(&str, &str)]) -> MemoryParameterStore {
    let store = MemoryParameterStore::new();
    for (name, value) in parameters {
        store.put_parameter(*name, *value);
    }
    store
}

/// Audit logger that keeps every event in memory for later inspection.
#[derive(Debug, Default)]
pub struct RecordingAuditLogger {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditLogger {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl AuditLogger for RecordingAuditLogger {
    async fn log(&self, event: &AuditEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Asserts that a [`StorageResult`](crate::StorageResult) is a
/// [`StorageError::NotFound`](crate::StorageError::NotFound).
#[macro_export]
macro_rules! assert_not_found {
    ($result:expr) => {{
        let result = $result;
        assert!(
            matches!(result, Err($crate::error::StorageError::NotFound { .. })),
            "expected StorageError::NotFound, got: {:?}",
            result,
        );
    }};
}

/// Asserts that a [`StorageResult`](crate::StorageResult) is a
/// [`StorageError::AccessDenied`](crate::StorageError::AccessDenied).
#[macro_export]
macro_rules! assert_access_denied {
    ($result:expr) => {{
        let result = $result;
        assert!(
            matches!(result, Err($crate::error::StorageError::AccessDenied { .. })),
            "expected StorageError::AccessDenied, got: {:?}",
            result,
        );
    }};
}
