//! Admin token validation for destructive transitions.
//!
//! The reference token lives in secret storage under an
//! environment-scoped parameter (`{prefix}/{environment}/admin_token`).
//! Validation never fails loudly: every problem, including an unreachable
//! store, yields `false`.
//!
//! # Constant-time comparison
//!
//! The supplied and reference tokens are compared with
//! [`subtle::ConstantTimeEq`], so equal-length tokens take the same time
//! to compare whatever their content. Token length is not treated as
//! secret.

use std::{fmt, sync::Arc};

use servergate_config::DeploymentConfig;
use servergate_storage::ParameterStore;
use subtle::ConstantTimeEq;

/// Length of a well-formed admin token (hex-encoded SHA-256 HMAC).
pub const ADMIN_TOKEN_LEN: usize = 64;

/// Returns `true` if `token` has the shape of a generated admin token:
/// exactly [`ADMIN_TOKEN_LEN`] hexadecimal characters.
#[must_use]
pub fn has_admin_token_shape(token: &str) -> bool {
    token.len() == ADMIN_TOKEN_LEN && token.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Compares two secrets without short-circuiting on the first differing byte.
#[must_use]
pub fn constant_time_eq(supplied: &[u8], expected: &[u8]) -> bool {
    supplied.ct_eq(expected).into()
}

/// Validates caller-supplied admin tokens against secret storage.
pub struct AdminTokenValidator {
    store: Arc<dyn ParameterStore>,
    parameter: Option<String>,
    environment: Option<String>,
}

impl AdminTokenValidator {
    /// Creates a validator for the configured environment.
    ///
    /// Without an environment the parameter name is unknown and every
    /// validation returns `false`.
    #[must_use]
    pub fn new(store: Arc<dyn ParameterStore>, config: &DeploymentConfig) -> Self {
        Self {
            store,
            parameter: config.admin_token_parameter().ok(),
            environment: config.environment().map(str::to_owned),
        }
    }

    /// Name of the parameter holding the reference token.
    #[must_use]
    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    /// Returns `true` only if `supplied` is present, non-empty and equal to
    /// the stored token.
    ///
    /// An absent or empty token returns `false` without reading secret
    /// storage.
    #[tracing::instrument(skip_all, fields(environment = ?self.environment))]
    pub async fn validate(&self, supplied: Option<&str>) -> bool {
        let supplied = match supplied {
            Some(token) if !token.is_empty() => token,
            _ => {
                tracing::debug!("No admin token provided");
                return false;
            },
        };

        let Some(parameter) = self.parameter.as_deref() else {
            tracing::warn!("Admin token parameter unknown, no environment configured");
            return false;
        };

        fail::fail_point!("admin-token-before-fetch", |_| false);

        let expected = match self.store.get_parameter(parameter, true).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, parameter, "Admin token fetch failed");
                return false;
            },
        };

        let matched = constant_time_eq(supplied.as_bytes(), expected.expose().as_bytes());
        tracing::info!(
            supplied_len = supplied.len(),
            format_valid = has_admin_token_shape(supplied),
            matched,
            "Admin token validation result"
        );
        matched
    }
}

impl fmt::Debug for AdminTokenValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminTokenValidator")
            .field("parameter", &self.parameter)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use rstest::rstest;
    use servergate_storage::{MemoryParameterStore, StorageError, testutil::store_with};

    use super::*;

    const PARAM: &str = "/minecraft/prod/admin_token";
    const TOKEN: &str = "3f2a9c4e1b7d8f6a0c5e2d9b4a7f1c3e8d6b0a5f2c9e4d7b1a8f3c6e0d5b2a9f";

    fn config() -> DeploymentConfig {
        DeploymentConfig::builder().environment("prod").build().unwrap()
    }

    fn validator() -> (AdminTokenValidator, Arc<MemoryParameterStore>) {
        let store = Arc::new(store_with(&[(PARAM, TOKEN)]));
        (AdminTokenValidator::new(store.clone(), &config()), store)
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[tokio::test]
    async fn test_empty_token_rejected_without_fetch(#[case] supplied: Option<&str>) {
        let (validator, store) = validator();
        assert!(!validator.validate(supplied).await);
        assert_eq!(store.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_correct_token_accepted() {
        let (validator, store) = validator();
        assert!(validator.validate(Some(TOKEN)).await);
        assert_eq!(store.fetch_count(), 1);
    }

    #[rstest]
    #[case("wrong")]
    #[case(&TOKEN[..63])]
    #[case(" 3f2a9c4e1b7d8f6a0c5e2d9b4a7f1c3e8d6b0a5f2c9e4d7b1a8f3c6e0d5b2a9f")]
    #[tokio::test]
    async fn test_wrong_token_rejected(#[case] supplied: &str) {
        let (validator, _store) = validator();
        assert!(!validator.validate(Some(supplied)).await);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_false() {
        let (validator, store) = validator();
        store.set_failure(Some(StorageError::connection("unreachable")));
        assert!(!validator.validate(Some(TOKEN)).await);

        store.set_failure(None);
        store.deny(PARAM);
        assert!(!validator.validate(Some(TOKEN)).await);
    }

    #[tokio::test]
    async fn test_missing_parameter_is_false() {
        let store = Arc::new(MemoryParameterStore::new());
        let validator = AdminTokenValidator::new(store, &config());
        assert!(!validator.validate(Some(TOKEN)).await);
    }

    #[tokio::test]
    async fn test_no_environment_is_false_without_fetch() {
        let store = Arc::new(store_with(&[(PARAM, TOKEN)]));
        let config = DeploymentConfig::builder().build().unwrap();
        let validator = AdminTokenValidator::new(store.clone(), &config);
        assert_eq!(validator.parameter(), None);
        assert!(!validator.validate(Some(TOKEN)).await);
        assert_eq!(store.fetch_count(), 0);
    }

    #[test]
    fn test_parameter_is_environment_scoped() {
        let (validator, _store) = validator();
        assert_eq!(validator.parameter(), Some(PARAM));
    }

    #[rstest]
    #[case(TOKEN, true)]
    #[case(&TOKEN[..63], false)]
    #[case("zz2a9c4e1b7d8f6a0c5e2d9b4a7f1c3e8d6b0a5f2c9e4d7b1a8f3c6e0d5b2a9f", false)]
    #[case("", false)]
    fn test_admin_token_shape(#[case] token: &str, #[case] expected: bool) {
        assert_eq!(has_admin_token_shape(token), expected);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(!constant_time_eq(b"", b"a"));
    }
}
