//! Shared test utilities for authentication testing.
//!
//! Provides fixture RSA key pairs, signed and hand-crafted JWTs, and a
//! verifier wired to an in-memory parameter store. Feature-gated behind
//! `testutil`:
//!
//! ```toml
//! [dev-dependencies]
//! servergate-authn = { path = "../authn", features = ["testutil"] }
//! ```
#![allow(clippy::expect_used)]

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::json;
use servergate_config::{AuthorizerSettings, DEFAULT_AUDIENCE, DEFAULT_ISSUER};
use servergate_storage::MemoryParameterStore;

use crate::verifier::CredentialVerifier;

/// PKCS#8 private key whose public half is installed by the helpers below.
pub const SIGNING_PRIVATE_KEY_PEM: &str = include_str!("../tests/fixtures/signing_private.pem");
/// SPKI public key matching [`SIGNING_PRIVATE_KEY_PEM`].
pub const SIGNING_PUBLIC_KEY_PEM: &str = include_str!("../tests/fixtures/signing_public.pem");
/// An unrelated private key, for forged signatures.
pub const ROGUE_PRIVATE_KEY_PEM: &str = include_str!("../tests/fixtures/rogue_private.pem");
/// SPKI public key matching [`ROGUE_PRIVATE_KEY_PEM`].
pub const ROGUE_PUBLIC_KEY_PEM: &str = include_str!("../tests/fixtures/rogue_public.pem");

/// Strips the armor and line breaks from a PEM, leaving the bare base64
/// body as it is commonly pasted into secret storage.
#[must_use]
pub fn bare_public_key(pem: &str) -> String {
    pem.lines().filter(|line| !line.starts_with("-----")).map(str::trim).collect()
}

/// Claims accepted by the default settings, valid for one hour.
#[must_use]
pub fn valid_claims() -> serde_json::Value {
    let now = Utc::now().timestamp();
    json!({
        "iss": DEFAULT_ISSUER,
        "aud": DEFAULT_AUDIENCE,
        "sub": "player-one",
        "exp": now + 3600,
        "iat": now,
    })
}

/// Signs arbitrary claims with RS256.
///
/// # Panics
///
/// Panics if the key is not an RSA private key.
#[must_use]
pub fn sign_claims(private_pem: &str, claims: &serde_json::Value) -> String {
    let encoding_key =
        EncodingKey::from_rsa_pem(private_pem.as_bytes()).expect("fixture RSA private key");
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), claims, &encoding_key)
        .expect("Failed to encode test JWT")
}

/// Creates an RS256 JWT for the given audience and issuer, valid for one hour.
#[must_use]
pub fn create_signed_jwt(private_pem: &str, audience: &str, issuer: &str) -> String {
    let mut claims = valid_claims();
    claims["aud"] = json!(audience);
    claims["iss"] = json!(issuer);
    sign_claims(private_pem, &claims)
}

/// Creates a raw JWT string from arbitrary header and payload JSON with an
/// empty signature.
///
/// # Panics
///
/// Panics if JSON serialization fails.
#[must_use]
pub fn craft_raw_jwt(header_json: &serde_json::Value, payload_json: &serde_json::Value) -> String {
    let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(header_json).expect("header json"));
    let payload_b64 =
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload_json).expect("payload json"));
    format!("{header_b64}.{payload_b64}.")
}

/// Formats a token as an `Authorization` header value.
#[must_use]
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// A store holding the bare fixture public key under the default parameter name.
#[must_use]
pub fn store_with_public_key() -> Arc<MemoryParameterStore> {
    let store = Arc::new(MemoryParameterStore::new());
    store.put_parameter(
        AuthorizerSettings::default().public_key_parameter,
        bare_public_key(SIGNING_PUBLIC_KEY_PEM),
    );
    store
}

/// A verifier with default settings, plus its store for fetch counting
/// and fault injection.
#[must_use]
pub fn verifier_with_store() -> (CredentialVerifier, Arc<MemoryParameterStore>) {
    let store = store_with_public_key();
    let verifier = CredentialVerifier::new(store.clone(), &AuthorizerSettings::default());
    (verifier, store)
}

/// Asserts that a [`Verdict`](crate::Verdict) is `Allow`.
#[macro_export]
macro_rules! assert_allow {
    ($verdict:expr) => {{
        let verdict = $verdict;
        assert!(
            matches!(verdict, $crate::Verdict::Allow),
            "expected Verdict::Allow, got: {:?}",
            verdict,
        );
    }};
}

/// Asserts that a [`Verdict`](crate::Verdict) is `Deny` with the given
/// [`DenyReason`](crate::DenyReason) variant.
#[macro_export]
macro_rules! assert_deny {
    ($verdict:expr, $reason:ident) => {{
        let verdict = $verdict;
        assert!(
            matches!(verdict, $crate::Verdict::Deny($crate::DenyReason::$reason)),
            "expected Verdict::Deny({}), got: {:?}",
            stringify!($reason),
            verdict,
        );
    }};
}
