//! Parameter store contract and in-memory implementation.
//!
//! This module provides the [`ParameterStore`] trait that abstracts the
//! external secret-storage service. The host wires in an adapter for its
//! managed parameter store; [`MemoryParameterStore`] backs tests and local
//! runs.
//!
//! # Usage
//!
//! ```no_run
//! use servergate_storage::{ParameterStore, SecretValue, StorageError};
//!
//! async fn read_key<S: ParameterStore>(store: &S) -> Result<SecretValue, StorageError> {
//!     store.get_parameter("/app/jwt/public-key", true).await
//! }
//! ```

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{
    error::{StorageError, StorageResult},
    types::SecretValue,
};

/// Read access to named parameters held in secret storage.
///
/// # Decryption
///
/// `decrypt` asks the store to return the plaintext of an encrypted
/// parameter. Decryption is a side effect of the read and may itself be
/// refused, in which case implementations return
/// [`StorageError::AccessDenied`].
///
/// # Error Handling
///
/// - [`StorageError::NotFound`] if no parameter has that name
/// - [`StorageError::AccessDenied`] if the caller may not read or decrypt it
/// - [`StorageError::Connection`] / [`StorageError::Timeout`] for transport faults
///
/// Implementations do not retry; the host owns retry policy.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Reads the current value of the parameter `name`.
    async fn get_parameter(&self, name: &str, decrypt: bool) -> StorageResult<SecretValue>;
}

#[async_trait]
impl<S: ParameterStore + ?Sized> ParameterStore for Arc<S> {
    async fn get_parameter(&self, name: &str, decrypt: bool) -> StorageResult<SecretValue> {
        (**self).get_parameter(name, decrypt).await
    }
}

/// In-memory [`ParameterStore`] for tests and local runs.
///
/// Besides plain storage it can refuse access to individual names, inject a
/// store-wide fault, and count reads, which lets tests assert that a code
/// path never touched secret storage.
///
/// # Examples
///
/// ```
/// use servergate_storage::{MemoryParameterStore, ParameterStore, StorageError};
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let store = MemoryParameterStore::new();
/// store.put_parameter("/app/jwt/public-key", "MIIBIjANBgkq...");
///
/// assert!(store.get_parameter("/app/jwt/public-key", true).await.is_ok());
/// assert!(matches!(
///     store.get_parameter("/missing", true).await,
///     Err(StorageError::NotFound { .. })
/// ));
/// assert_eq!(store.fetch_count(), 2);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryParameterStore {
    parameters: RwLock<HashMap<String, SecretValue>>,
    denied: RwLock<HashSet<String>>,
    failure: RwLock<Option<StorageError>>,
    fetches: AtomicU64,
}

impl MemoryParameterStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a parameter.
    pub fn put_parameter(&self, name: impl Into<String>, value: impl Into<SecretValue>) {
        self.parameters.write().insert(name.into(), value.into());
    }

    /// Removes a parameter. Returns `true` if it existed.
    pub fn remove_parameter(&self, name: &str) -> bool {
        self.parameters.write().remove(name).is_some()
    }

    /// Makes every read of `name` fail with [`StorageError::AccessDenied`].
    pub fn deny(&self, name: impl Into<String>) {
        self.denied.write().insert(name.into());
    }

    /// Makes every read fail with `error` until cleared with `None`.
    pub fn set_failure(&self, error: Option<StorageError>) {
        *self.failure.write() = error;
    }

    /// Number of `get_parameter` calls observed, including failed ones.
    #[must_use]
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ParameterStore for MemoryParameterStore {
    #[tracing::instrument(skip(self))]
    async fn get_parameter(&self, name: &str, decrypt: bool) -> StorageResult<SecretValue> {
        self.fetches.fetch_add(1, Ordering::Relaxed);

        if let Some(error) = self.failure.read().clone() {
            return Err(error);
        }
        if self.denied.read().contains(name) {
            return Err(StorageError::access_denied(name));
        }

        self.parameters.read().get(name).cloned().ok_or_else(|| StorageError::not_found(name))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_existing_parameter() {
        let store = MemoryParameterStore::new();
        store.put_parameter("/app/dev/admin_token", "abc123");

        let value = store.get_parameter("/app/dev/admin_token", true).await.unwrap();
        assert_eq!(value.expose(), "abc123");
        assert_eq!(store.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_parameter_is_not_found() {
        let store = MemoryParameterStore::new();
        let result = store.get_parameter("/nope", true).await;
        assert!(matches!(result, Err(StorageError::NotFound { ref name }) if name == "/nope"));
    }

    #[tokio::test]
    async fn test_denied_parameter() {
        let store = MemoryParameterStore::new();
        store.put_parameter("/secret", "v");
        store.deny("/secret");

        let result = store.get_parameter("/secret", true).await;
        assert!(matches!(result, Err(StorageError::AccessDenied { .. })));
    }

    #[tokio::test]
    async fn test_injected_failure_applies_to_all_reads() {
        let store = MemoryParameterStore::new();
        store.put_parameter("/a", "1");
        store.set_failure(Some(StorageError::connection("store unreachable")));

        assert!(matches!(store.get_parameter("/a", true).await, Err(StorageError::Connection { .. })));

        store.set_failure(None);
        assert!(store.get_parameter("/a", true).await.is_ok());
        assert_eq!(store.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_put_replaces_and_remove() {
        let store = MemoryParameterStore::new();
        store.put_parameter("/k", "old");
        store.put_parameter("/k", "new");
        assert_eq!(store.get_parameter("/k", false).await.unwrap().expose(), "new");

        assert!(store.remove_parameter("/k"));
        assert!(!store.remove_parameter("/k"));
    }

    #[tokio::test]
    async fn test_arc_store_delegates() {
        let store = Arc::new(MemoryParameterStore::new());
        store.put_parameter("/k", "v");
        let dyn_store: Arc<dyn ParameterStore> = store.clone();

        assert_eq!(dyn_store.get_parameter("/k", true).await.unwrap().expose(), "v");
        assert_eq!(store.fetch_count(), 1);
    }
}
