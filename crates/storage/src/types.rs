//! Value types returned by the parameter store.

use std::fmt;

use zeroize::Zeroizing;

/// A parameter value read from secret storage.
///
/// The contents are scrubbed from memory on drop and never appear in
/// `Debug` output, so a `SecretValue` can travel through `tracing` fields
/// and error messages without leaking the secret.
///
/// # Examples
///
/// ```
/// use servergate_storage::SecretValue;
///
/// let value = SecretValue::from("hunter2");
/// assert_eq!(value.expose(), "hunter2");
/// assert_eq!(format!("{value:?}"), "SecretValue(len=7)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue(Zeroizing<String>);

impl SecretValue {
    /// Wraps a raw parameter value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Borrows the plaintext.
    ///
    /// Callers must not log or persist the returned string.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Length of the value in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the value is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretValue(len={})", self.0.len())
    }
}

impl From<String> for SecretValue {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let value = SecretValue::from("top-secret-admin-token");
        let rendered = format!("{value:?}");
        assert!(!rendered.contains("top-secret"));
        assert_eq!(rendered, "SecretValue(len=22)");
    }

    #[test]
    fn test_expose_and_len() {
        let value = SecretValue::new(String::from("abc"));
        assert_eq!(value.expose(), "abc");
        assert_eq!(value.len(), 3);
        assert!(!value.is_empty());
        assert!(SecretValue::from("").is_empty());
    }
}
