//! Bearer credential verification.
//!
//! The pipeline is strictly ordered so that cheap rejections never touch
//! secret storage:
//!
//! 1. Extract `Bearer <token>` from the raw header
//! 2. Read the unverified `alg` and reject anything but RS256
//! 3. Fetch and normalize the public key
//! 4. Verify signature, `aud`, `iss`, `exp` and `nbf`
//!
//! Every failure, including a key that cannot be fetched or parsed, becomes
//! [`Verdict::Deny`].

use std::{fmt, sync::Arc};

use servergate_config::AuthorizerSettings;
use servergate_storage::ParameterStore;

use crate::{
    error::Result,
    jwt::{JwtClaims, extract_bearer, peek_algorithm, verify_rs256},
    signing_key::fetch_decoding_key,
    validation::validate_algorithm,
    verdict::Verdict,
};

/// Verifies bearer credentials against the public key held in secret storage.
pub struct CredentialVerifier {
    store: Arc<dyn ParameterStore>,
    key_parameter: String,
    audience: String,
    issuer: String,
}

impl CredentialVerifier {
    /// Creates a verifier reading the key parameter and expected claims
    /// from `settings`.
    #[must_use]
    pub fn new(store: Arc<dyn ParameterStore>, settings: &AuthorizerSettings) -> Self {
        Self {
            store,
            key_parameter: settings.public_key_parameter.clone(),
            audience: settings.audience.clone(),
            issuer: settings.issuer.clone(),
        }
    }

    /// Name of the parameter holding the public key.
    #[must_use]
    pub fn key_parameter(&self) -> &str {
        &self.key_parameter
    }

    /// Expected `aud` claim.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Expected `iss` claim.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Verify a raw `Authorization` header against the configured audience
    /// and issuer.
    pub async fn verify(&self, raw_header: Option<&str>) -> Verdict {
        self.verify_with(raw_header, &self.audience, &self.issuer).await
    }

    /// Verify a raw `Authorization` header against explicit expectations.
    #[tracing::instrument(skip(self, raw_header), fields(key_parameter = %self.key_parameter))]
    pub async fn verify_with(
        &self,
        raw_header: Option<&str>,
        expected_audience: &str,
        expected_issuer: &str,
    ) -> Verdict {
        match self.try_verify(raw_header, expected_audience, expected_issuer).await {
            Ok(_) => {
                tracing::debug!("Credential verified");
                Verdict::Allow
            },
            Err(e) => {
                let reason = e.deny_reason();
                if e.is_internal() {
                    tracing::warn!(error = %e, %reason, "Public key unavailable, denying");
                } else {
                    tracing::debug!(error = %e, %reason, "Credential rejected");
                }
                Verdict::Deny(reason)
            },
        }
    }

    /// Run the verification pipeline and return the verified claims.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`](crate::AuthError) of the first failing step.
    pub async fn try_verify(
        &self,
        raw_header: Option<&str>,
        expected_audience: &str,
        expected_issuer: &str,
    ) -> Result<JwtClaims> {
        let token = extract_bearer(raw_header)?;
        validate_algorithm(&peek_algorithm(token)?)?;

        let key = fetch_decoding_key(self.store.as_ref(), &self.key_parameter).await?;
        verify_rs256(token, &key, expected_audience, expected_issuer)
    }
}

impl fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("key_parameter", &self.key_parameter)
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}
