//! Public signing key retrieval and PEM normalization.
//!
//! The key is stored in secret storage either fully armored or as a bare
//! base64 body. A bare body is re-armored on every fetch:
//!
//! ```text
//! -----BEGIN PUBLIC KEY-----
//! <body, 64 characters per line>
//! -----END PUBLIC KEY-----
//! ```
//!
//! There is no cache. Every verification reads the parameter again so a
//! rotated key takes effect on the next request.

use jsonwebtoken::DecodingKey;
use servergate_storage::ParameterStore;

use crate::error::AuthError;

/// Marker that identifies an already-armored value.
pub const ARMOR_MARKER: &str = "-----BEGIN";
/// Header line written around a bare key body.
pub const PEM_HEADER: &str = "-----BEGIN PUBLIC KEY-----";
/// Footer line written around a bare key body.
pub const PEM_FOOTER: &str = "-----END PUBLIC KEY-----";
/// Width of each body line.
pub const PEM_LINE_WIDTH: usize = 64;

/// Returns `true` if the value already starts with a PEM armor header.
#[must_use]
pub fn is_armored(raw: &str) -> bool {
    raw.trim_start().starts_with(ARMOR_MARKER)
}

/// Normalize stored key text into PEM.
///
/// Armored values are returned unchanged. Anything else has all whitespace
/// removed and is wrapped at [`PEM_LINE_WIDTH`] columns between
/// [`PEM_HEADER`] and [`PEM_FOOTER`]. Applying this twice gives the same
/// result as applying it once.
///
/// # Examples
///
/// ```
/// use servergate_authn::signing_key::normalize_public_key;
///
/// let pem = normalize_public_key("QUJD");
/// assert_eq!(pem, "-----BEGIN PUBLIC KEY-----\nQUJD\n-----END PUBLIC KEY-----");
/// assert_eq!(normalize_public_key(&pem), pem);
/// ```
#[must_use]
pub fn normalize_public_key(raw: &str) -> String {
    if is_armored(raw) {
        return raw.to_owned();
    }

    let body: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    // The body is base64, so byte chunks are always on character boundaries.
    let lines: Vec<&str> = body
        .as_bytes()
        .chunks(PEM_LINE_WIDTH)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .collect();

    let mut pem = String::with_capacity(body.len() + lines.len() + PEM_HEADER.len() + PEM_FOOTER.len() + 2);
    pem.push_str(PEM_HEADER);
    pem.push('\n');
    for line in lines {
        pem.push_str(line);
        pem.push('\n');
    }
    pem.push_str(PEM_FOOTER);
    pem
}

/// Parse PEM text into an RSA decoding key.
///
/// # Errors
///
/// Returns [`AuthError::InvalidPublicKey`] if the text is not an RSA public key.
pub fn decoding_key_from_pem(pem: &str) -> Result<DecodingKey, AuthError> {
    DecodingKey::from_rsa_pem(pem.as_bytes())
        .map_err(|e| AuthError::invalid_public_key(format!("not an RSA public key: {e}")))
}

/// Fetch the current public key from secret storage and parse it.
///
/// # Errors
///
/// - [`AuthError::KeyStorage`] if the parameter cannot be read
/// - [`AuthError::InvalidPublicKey`] if the stored value does not parse
#[tracing::instrument(skip(store))]
pub async fn fetch_decoding_key(
    store: &dyn ParameterStore,
    parameter: &str,
) -> Result<DecodingKey, AuthError> {
    fail::fail_point!("verifier-before-key-fetch", |_| {
        Err(AuthError::KeyStorage(servergate_storage::StorageError::internal(
            "injected failure before key fetch",
        )))
    });

    let raw = store.get_parameter(parameter, true).await?;
    let armored = is_armored(raw.expose());
    tracing::debug!(armored, key_len = raw.len(), "Fetched public key");

    decoding_key_from_pem(&normalize_public_key(raw.expose()))
}
