//! JWT algorithm validation.
//!
//! Only RS256 is accepted. The check runs on the unverified header before
//! the public key is fetched, so a token announcing `none` or an HMAC
//! algorithm never causes a storage read.

use crate::error::AuthError;

/// Algorithms that are never accepted.
///
/// - `none`: no signature at all
/// - `HS256`, `HS384`, `HS512`: symmetric, would let the public key act as a shared secret
pub const FORBIDDEN_ALGORITHMS: &[&str] = &["none", "HS256", "HS384", "HS512"];

/// Accepted JWT algorithms.
pub const ACCEPTED_ALGORITHMS: &[&str] = &["RS256"];

/// Validate a JWT `alg` header value.
///
/// # Errors
///
/// Returns [`AuthError::UnsupportedAlgorithm`] if the algorithm is
/// forbidden or not in [`ACCEPTED_ALGORITHMS`].
///
/// # Examples
///
/// ```
/// use servergate_authn::validation::validate_algorithm;
///
/// assert!(validate_algorithm("RS256").is_ok());
/// assert!(validate_algorithm("HS256").is_err());
/// assert!(validate_algorithm("ES256").is_err());
/// ```
pub fn validate_algorithm(alg: &str) -> Result<(), AuthError> {
    if FORBIDDEN_ALGORITHMS.contains(&alg) {
        return Err(AuthError::unsupported_algorithm(format!(
            "Algorithm '{alg}' is not allowed for security reasons"
        )));
    }

    if !ACCEPTED_ALGORITHMS.contains(&alg) {
        return Err(AuthError::unsupported_algorithm(format!(
            "Algorithm '{alg}' is not in accepted list (only RS256 is supported)"
        )));
    }

    Ok(())
}
