//! # Cipher Key Derivation
//!
//! The merchant receives an arbitrary-length secret from the bank (25
//! characters in practice). The gateway expects the AES-128 key to be the
//! first 16 bytes of `SHA-256(secret)`.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::config::{ConfigError, CIPHER_KEY_LENGTH};

/// A derived AES-128 key.
///
/// `Debug` never prints the key bytes, so a stray `{:?}` in a log line
/// cannot leak it.
#[derive(Clone, PartialEq, Eq)]
pub struct CipherKey([u8; CIPHER_KEY_LENGTH]);

impl CipherKey {
    /// Wraps raw key bytes. Only tests and tools should need this; the relay
    /// always goes through [`derive_key`].
    pub fn from_bytes(bytes: [u8; CIPHER_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; CIPHER_KEY_LENGTH] {
        &self.0
    }
}

impl AsRef<[u8]> for CipherKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CipherKey(<redacted>)")
    }
}

/// Derives the gateway cipher key from the operator secret.
///
/// Pure: the same secret always gives the same key, and the key is always
/// [`CIPHER_KEY_LENGTH`] bytes no matter how long the secret is.
///
/// # Errors
///
/// [`ConfigError::EmptySecret`] if `secret` is empty.
///
/// # Example
///
/// ```
/// use c2p_protocol::crypto::derive_key;
///
/// let key = derive_key("A11103402525120190822HB01").unwrap();
/// assert_eq!(key.as_bytes().len(), 16);
/// ```
pub fn derive_key(secret: &str) -> Result<CipherKey, ConfigError> {
    if secret.is_empty() {
        return Err(ConfigError::EmptySecret);
    }

    let digest = Sha256::digest(secret.as_bytes());
    let mut key = [0u8; CIPHER_KEY_LENGTH];
    key.copy_from_slice(&digest[..CIPHER_KEY_LENGTH]);
    Ok(CipherKey(key))
}
