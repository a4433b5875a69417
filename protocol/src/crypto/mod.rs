//! # Cryptographic Primitives for the Gateway Wire Format
//!
//! Two things live here and nothing else:
//!
//! - **Key derivation** - SHA-256 of the operator secret, truncated to 16 bytes.
//! - **Field encryption** - AES-128 in ECB mode with PKCS#7 padding, base64 out.
//!
//! ECB leaks equal-block patterns and carries no integrity tag. The bank's
//! C2P gateway decrypts exactly this construction, so this module reproduces
//! it bit-for-bit instead of reaching for an AEAD. Do not use it for anything
//! the gateway does not consume.

pub mod encryption;
pub mod keys;

pub use encryption::{decrypt, encrypt, EncryptionError};
pub use keys::{derive_key, CipherKey};
