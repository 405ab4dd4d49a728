//! Authentication error types.
//!
//! Every variant here ends in a `Deny` at the authorizer boundary. The
//! variant itself is kept for logs and audit through [`AuthError::deny_reason`],
//! which maps it onto the fieldless [`DenyReason`](crate::DenyReason) tag.

use servergate_storage::StorageError;
use thiserror::Error;

use crate::verdict::DenyReason;

/// Authentication errors.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]`. Downstream match expressions
/// must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// No authorization header was supplied.
    #[error("Missing credential")]
    MissingCredential,

    /// The header is not of the form `Bearer <token>`.
    #[error("Malformed authorization header: {0}")]
    MalformedHeader(String),

    /// Malformed JWT, cannot be decoded.
    #[error("Invalid token format: {0}")]
    InvalidTokenFormat(String),

    /// Algorithm not in allowed list.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Token has expired.
    #[error("Token expired")]
    TokenExpired,

    /// Token not yet valid (nbf claim in future).
    #[error("Token not yet valid")]
    TokenNotYetValid,

    /// Audience doesn't match expected value.
    #[error("Invalid audience: {0}")]
    InvalidAudience(String),

    /// Issuer doesn't match expected value.
    #[error("Invalid issuer: {0}")]
    InvalidIssuer(String),

    /// Required claim is missing.
    #[error("Missing claim: {0}")]
    MissingClaim(String),

    /// The stored public key could not be parsed.
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Secret storage failed while fetching the public key.
    ///
    /// Wraps the original [`StorageError`] to preserve the source chain.
    #[error("Key storage error: {0}")]
    KeyStorage(
        /// The underlying storage error.
        #[source]
        StorageError,
    ),
}

impl AuthError {
    /// Creates a new `MalformedHeader` error.
    #[must_use]
    pub fn malformed_header(message: impl Into<String>) -> Self {
        Self::MalformedHeader(message.into())
    }

    /// Creates a new `InvalidTokenFormat` error.
    #[must_use]
    pub fn invalid_token_format(message: impl Into<String>) -> Self {
        Self::InvalidTokenFormat(message.into())
    }

    /// Creates a new `UnsupportedAlgorithm` error.
    #[must_use]
    pub fn unsupported_algorithm(message: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm(message.into())
    }

    /// Creates a new `InvalidAudience` error.
    #[must_use]
    pub fn invalid_audience(message: impl Into<String>) -> Self {
        Self::InvalidAudience(message.into())
    }

    /// Creates a new `InvalidIssuer` error.
    #[must_use]
    pub fn invalid_issuer(message: impl Into<String>) -> Self {
        Self::InvalidIssuer(message.into())
    }

    /// Creates a new `MissingClaim` error.
    #[must_use]
    pub fn missing_claim(claim: impl Into<String>) -> Self {
        Self::MissingClaim(claim.into())
    }

    /// Creates a new `InvalidPublicKey` error.
    #[must_use]
    pub fn invalid_public_key(message: impl Into<String>) -> Self {
        Self::InvalidPublicKey(message.into())
    }

    /// Returns `true` for faults outside the caller's control (key storage
    /// or key parsing) as opposed to a rejected credential.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::KeyStorage(_) | Self::InvalidPublicKey(_))
    }

    /// Maps this error onto the tag recorded with a `Deny` decision.
    #[must_use]
    pub fn deny_reason(&self) -> DenyReason {
        match self {
            Self::MissingCredential => DenyReason::MissingCredential,
            Self::MalformedHeader(_) => DenyReason::MalformedHeader,
            Self::InvalidTokenFormat(_) => DenyReason::MalformedToken,
            Self::UnsupportedAlgorithm(_) => DenyReason::UnsupportedAlgorithm,
            Self::InvalidSignature => DenyReason::InvalidSignature,
            Self::TokenExpired => DenyReason::Expired,
            Self::TokenNotYetValid => DenyReason::NotYetValid,
            Self::InvalidAudience(_) => DenyReason::AudienceMismatch,
            Self::InvalidIssuer(_) => DenyReason::IssuerMismatch,
            Self::MissingClaim(_) => DenyReason::MissingClaim,
            Self::InvalidPublicKey(_) => DenyReason::InvalidKey,
            Self::KeyStorage(_) => DenyReason::KeyUnavailable,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                AuthError::invalid_token_format(format!("JWT error: {err}"))
            },
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
            ErrorKind::InvalidAudience => {
                AuthError::invalid_audience("Audience validation failed")
            },
            ErrorKind::InvalidIssuer => AuthError::invalid_issuer("Issuer validation failed"),
            ErrorKind::MissingRequiredClaim(claim) => AuthError::missing_claim(claim.as_str()),
            ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => {
                AuthError::unsupported_algorithm("Algorithm not supported")
            },
            ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
                AuthError::invalid_public_key(err.to_string())
            },
            _ => AuthError::invalid_token_format(format!("JWT error: {err}")),
        }
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        AuthError::KeyStorage(err)
    }
}

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;
