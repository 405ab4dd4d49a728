//! # servergate authentication
//!
//! Request-time authorization for the servergate front door.
//!
//! This crate provides:
//! - **Credential verification**: RS256 bearer tokens checked against a public key held in
//!   secret storage
//! - **Key normalization**: bare base64 keys are re-armored into PEM on every fetch
//! - **Policy synthesis**: allow/deny decisions rendered as the front door's policy document
//!
//! Every failure, including an unreachable key store, ends in `Deny`.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use servergate_authn::Authorizer;
//! use servergate_config::AuthorizerSettings;
//! use servergate_storage::MemoryParameterStore;
//!
//! # async fn example() {
//! let store = Arc::new(MemoryParameterStore::new());
//! let authorizer = Authorizer::new(store, &AuthorizerSettings::default());
//!
//! let event = serde_json::json!({
//!     "type": "REQUEST",
//!     "identitySource": ["Bearer eyJhbGciOiJSUzI1NiJ9..."],
//!     "routeArn": "arn:aws:execute-api:us-west-2:123456789012:api/$default/POST/server",
//! });
//! let policy = authorizer.handle_event(event).await;
//! println!("{}", serde_json::to_string(&policy).unwrap_or_default());
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Authorizer entry point.
pub mod authorizer;
/// Authentication error types.
pub mod error;
/// JWT decoding and verification.
pub mod jwt;
/// Policy synthesis.
pub mod policy;
/// Public key retrieval and normalization.
pub mod signing_key;
/// Test helpers.
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;
/// Algorithm validation.
pub mod validation;
/// Verification outcomes.
pub mod verdict;
/// Bearer credential verifier.
pub mod verifier;

pub use authorizer::{AuthorizationDecision, Authorizer, AuthorizerEvent};
pub use error::{AuthError, Result};
pub use jwt::JwtClaims;
pub use policy::{Effect, PolicyResponse, synthesize};
pub use signing_key::normalize_public_key;
pub use validation::{ACCEPTED_ALGORITHMS, FORBIDDEN_ALGORITHMS, validate_algorithm};
pub use verdict::{DenyReason, Verdict};
pub use verifier::CredentialVerifier;
