//! # AES-128-ECB Field Encryption
//!
//! The C2P gateway wants its sensitive fields (destination id, origin phone,
//! purchase key) as `base64(AES-128-ECB(PKCS7(utf8(field))))`.
//!
//! ## Wire format
//!
//! 1. The plaintext is encoded as UTF-8.
//! 2. PKCS#7 appends `N` bytes of value `N`, `N = 16 - len % 16`. Aligned
//!    input (including empty input) gets a full block of `0x10`.
//! 3. Every 16-byte block is encrypted on its own under the same key. No IV,
//!    no chaining.
//! 4. The ciphertext is base64-encoded with the standard alphabet and `=`
//!    padding.
//!
//! Output is deterministic: the same key and plaintext always give the same
//! string. The gateway relies on that.

use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Block};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use crate::config::{CIPHER_BLOCK_SIZE, CIPHER_KEY_LENGTH};

/// Errors from the field cipher.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncryptionError {
    #[error("invalid key length: expected {CIPHER_KEY_LENGTH} bytes, received {received}")]
    InvalidKeyLength { received: usize },

    #[error("ciphertext is not valid base64")]
    InvalidBase64,

    #[error("ciphertext length {0} is not a positive multiple of {CIPHER_BLOCK_SIZE}")]
    InvalidCiphertextLength(usize),

    #[error("invalid PKCS#7 padding")]
    InvalidPadding,

    #[error("decrypted data is not valid UTF-8")]
    InvalidUtf8,
}

fn cipher_for(key: &[u8]) -> Result<Aes128, EncryptionError> {
    if key.len() != CIPHER_KEY_LENGTH {
        return Err(EncryptionError::InvalidKeyLength {
            received: key.len(),
        });
    }
    Aes128::new_from_slice(key).map_err(|_| EncryptionError::InvalidKeyLength {
        received: key.len(),
    })
}

/// Appends PKCS#7 padding for [`CIPHER_BLOCK_SIZE`].
pub fn pkcs7_pad(data: &[u8]) -> Vec<u8> {
    let pad_len = CIPHER_BLOCK_SIZE - (data.len() % CIPHER_BLOCK_SIZE);
    let mut padded = Vec::with_capacity(data.len() + pad_len);
    padded.extend_from_slice(data);
    padded.resize(data.len() + pad_len, pad_len as u8);
    padded
}

/// Strips and checks PKCS#7 padding. Every padding byte must agree.
pub fn pkcs7_unpad(data: &[u8]) -> Result<&[u8], EncryptionError> {
    let pad_len = *data.last().ok_or(EncryptionError::InvalidPadding)? as usize;
    if pad_len == 0 || pad_len > CIPHER_BLOCK_SIZE || pad_len > data.len() {
        return Err(EncryptionError::InvalidPadding);
    }

    let (body, padding) = data.split_at(data.len() - pad_len);
    if padding.iter().any(|&b| b as usize != pad_len) {
        return Err(EncryptionError::InvalidPadding);
    }
    Ok(body)
}

/// Pads and encrypts raw bytes, block by block.
///
/// The output length is always a multiple of 16 and between 1 and 16 bytes
/// longer than the input.
pub fn encrypt_bytes(key: &[u8], data: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let cipher = cipher_for(key)?;
    let mut buf = pkcs7_pad(data);

    for chunk in buf.chunks_exact_mut(CIPHER_BLOCK_SIZE) {
        let block = Block::from_mut_slice(chunk);
        cipher.encrypt_block(block);
    }
    Ok(buf)
}

/// Inverse of [`encrypt_bytes`]: decrypts every block and strips padding.
pub fn decrypt_bytes(key: &[u8], data: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let cipher = cipher_for(key)?;
    if data.is_empty() || data.len() % CIPHER_BLOCK_SIZE != 0 {
        return Err(EncryptionError::InvalidCiphertextLength(data.len()));
    }

    let mut buf = data.to_vec();
    for chunk in buf.chunks_exact_mut(CIPHER_BLOCK_SIZE) {
        let block = Block::from_mut_slice(chunk);
        cipher.decrypt_block(block);
    }

    let body_len = pkcs7_unpad(&buf)?.len();
    buf.truncate(body_len);
    Ok(buf)
}

/// Encrypts a string field for the gateway and returns base64 text.
///
/// # Errors
///
/// [`EncryptionError::InvalidKeyLength`] if `key` is not exactly 16 bytes.
///
/// # Example
///
/// ```
/// use c2p_protocol::crypto::{decrypt, derive_key, encrypt};
///
/// let key = derive_key("merchant secret").unwrap();
/// let sealed = encrypt(key.as_bytes(), "584142591177").unwrap();
/// assert_eq!(sealed, encrypt(key.as_bytes(), "584142591177").unwrap());
/// assert_eq!(decrypt(key.as_bytes(), &sealed).unwrap(), "584142591177");
/// ```
pub fn encrypt(key: &[u8], plaintext: &str) -> Result<String, EncryptionError> {
    let ciphertext = encrypt_bytes(key, plaintext.as_bytes())?;
    Ok(STANDARD.encode(ciphertext))
}

/// Decrypts a base64 field produced by [`encrypt`].
///
/// The relay never needs this on the request path. It exists so captured
/// payloads can be checked against what the client sent.
pub fn decrypt(key: &[u8], ciphertext: &str) -> Result<String, EncryptionError> {
    let raw = STANDARD
        .decode(ciphertext.trim())
        .map_err(|_| EncryptionError::InvalidBase64)?;
    let plain = decrypt_bytes(key, &raw)?;
    String::from_utf8(plain).map_err(|_| EncryptionError::InvalidUtf8)
}
