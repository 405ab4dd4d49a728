//! JWT decoding and verification.
//!
//! # Example
//!
//! ```no_run
//! use servergate_authn::jwt::{extract_bearer, peek_algorithm};
//!
//! # fn example(header: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
//! let token = extract_bearer(header)?;
//! println!("Algorithm: {}", peek_algorithm(token)?);
//! # Ok(())
//! # }
//! ```

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Authorization scheme prefix, including the separating space.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Claims the authorizer reads from a verified token.
///
/// `aud` and `iss` are optional here so that a token lacking them reaches
/// the required-claim check and is reported as such. After
/// [`verify_rs256`] succeeds both are present. `exp` and `nbf` are checked
/// by `jsonwebtoken` itself, which accepts fractional NumericDates, so they
/// are not decoded here. Anything else the issuer includes is ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience, either one value or a list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
}

/// The `aud` claim, which RFC 7519 allows as a string or an array.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    /// A single audience.
    Single(String),
    /// Several audiences.
    Multiple(Vec<String>),
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Extract the token from a raw `Authorization` header value.
///
/// The header must start with `Bearer ` (case-sensitive) and carry a
/// non-empty token after it.
///
/// # Errors
///
/// - [`AuthError::MissingCredential`] if the header is absent or blank
/// - [`AuthError::MalformedHeader`] for any other scheme or an empty token
///
/// # Examples
///
/// ```
/// use servergate_authn::jwt::extract_bearer;
///
/// assert_eq!(extract_bearer(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
/// assert!(extract_bearer(Some("Basic dXNlcjpwYXNz")).is_err());
/// assert!(extract_bearer(None).is_err());
/// ```
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let header = match header {
        Some(h) if !h.trim().is_empty() => h,
        _ => return Err(AuthError::MissingCredential),
    };

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(|| AuthError::malformed_header("expected 'Bearer' scheme"))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::malformed_header("empty bearer token"));
    }
    Ok(token)
}

/// Read the `alg` header field without verifying anything.
///
/// Unlike [`jsonwebtoken::decode_header`] this accepts algorithm names the
/// library does not model (such as `none`), so the caller can reject them
/// with a precise error.
///
/// # Errors
///
/// Returns [`AuthError::InvalidTokenFormat`] if the token does not have
/// three segments or the header segment is not base64url JSON with an `alg`.
pub fn peek_algorithm(token: &str) -> Result<String, AuthError> {
    let mut parts = token.split('.');
    let (Some(header_b64), Some(_), Some(_), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(AuthError::invalid_token_format("JWT must have 3 parts separated by dots"));
    };

    let header_bytes = URL_SAFE_NO_PAD.decode(header_b64).map_err(|e| {
        AuthError::invalid_token_format(format!("Failed to decode JWT header: {e}"))
    })?;
    let header: RawHeader = serde_json::from_slice(&header_bytes).map_err(|e| {
        AuthError::invalid_token_format(format!("Failed to parse JWT header: {e}"))
    })?;

    Ok(header.alg)
}

/// Build the validation rules for RS256 tokens.
///
/// `aud` and `iss` are required and must equal the expected values. `exp`
/// and `nbf` are checked only when present, with zero leeway.
#[must_use]
pub fn rs256_validation(expected_audience: &str, expected_issuer: &str) -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.set_audience(&[expected_audience]);
    validation.set_issuer(&[expected_issuer]);
    validation.set_required_spec_claims(&["aud", "iss"]);
    validation
}

/// Verify an RS256 token's signature and claims.
///
/// # Errors
///
/// Returns the [`AuthError`] matching the first check that failed.
pub fn verify_rs256(
    token: &str,
    key: &DecodingKey,
    expected_audience: &str,
    expected_issuer: &str,
) -> Result<JwtClaims, AuthError> {
    let validation = rs256_validation(expected_audience, expected_issuer);
    let token_data = decode::<JwtClaims>(token, key, &validation)?;
    Ok(token_data.claims)
}
