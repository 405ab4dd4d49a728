//! Verification outcomes.

use std::fmt;

/// Why a credential was denied.
///
/// Recorded in logs and the audit trail only. The front door sees a bare
/// `Deny` whatever the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    /// No authorization header.
    MissingCredential,
    /// Header present but not `Bearer <token>`.
    MalformedHeader,
    /// Token is not a decodable JWT.
    MalformedToken,
    /// Token uses an algorithm other than RS256.
    UnsupportedAlgorithm,
    /// Signature does not verify against the current key.
    InvalidSignature,
    /// `exp` is in the past.
    Expired,
    /// `nbf` is in the future.
    NotYetValid,
    /// `aud` differs from the expected audience.
    AudienceMismatch,
    /// `iss` differs from the expected issuer.
    IssuerMismatch,
    /// `aud` or `iss` is absent.
    MissingClaim,
    /// The public key could not be fetched.
    KeyUnavailable,
    /// The stored public key does not parse as an RSA key.
    InvalidKey,
    /// The authorizer event itself could not be read.
    MalformedEvent,
}

impl DenyReason {
    /// Returns the snake_case tag for this reason.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::MalformedHeader => "malformed_header",
            Self::MalformedToken => "malformed_token",
            Self::UnsupportedAlgorithm => "unsupported_algorithm",
            Self::InvalidSignature => "invalid_signature",
            Self::Expired => "expired",
            Self::NotYetValid => "not_yet_valid",
            Self::AudienceMismatch => "audience_mismatch",
            Self::IssuerMismatch => "issuer_mismatch",
            Self::MissingClaim => "missing_claim",
            Self::KeyUnavailable => "key_unavailable",
            Self::InvalidKey => "invalid_key",
            Self::MalformedEvent => "malformed_event",
        }
    }

    /// Returns `true` when the denial stems from a fault on our side rather
    /// than from the presented credential.
    #[must_use]
    pub fn is_internal(self) -> bool {
        matches!(self, Self::KeyUnavailable | Self::InvalidKey)
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of verifying one bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The credential is valid.
    Allow,
    /// The credential was rejected.
    Deny(DenyReason),
}

impl Verdict {
    /// Returns `true` for [`Verdict::Allow`].
    #[must_use]
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Returns the deny reason, if any.
    #[must_use]
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Self::Allow => None,
            Self::Deny(reason) => Some(*reason),
        }
    }
}
