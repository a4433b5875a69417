//! # Relay Configuration & Constants
//!
//! Every fixed parameter of the C2P integration lives here, next to the
//! startup configuration that the node builds once and hands to the
//! [`PaymentService`](crate::service::PaymentService).
//!
//! The cipher parameters are not tunables. They are what the bank's gateway
//! decrypts with, and changing any of them breaks every payment.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::crypto::keys::{derive_key, CipherKey};

// ---------------------------------------------------------------------------
// Cipher Parameters
// ---------------------------------------------------------------------------

/// AES-128 key length in bytes. The derived key is always this long.
pub const CIPHER_KEY_LENGTH: usize = 16;

/// AES block size in bytes. PKCS#7 pads to a multiple of this.
pub const CIPHER_BLOCK_SIZE: usize = 16;

/// Human-readable name of the mandated scheme, for logs and docs.
pub const CIPHER_SCHEME: &str = "AES-128-ECB/PKCS7/base64";

// ---------------------------------------------------------------------------
// Gateway Parameters
// ---------------------------------------------------------------------------

/// Upper bound on one gateway round-trip, connect through body.
pub const GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the gateway client id on every outbound call.
pub const CLIENT_ID_HEADER: &str = "X-IBM-Client-Id";

/// The gateway only settles in bolívares.
pub const CURRENCY_CODE: &str = "VES";

/// Description sent when `PAYMENT_DESCRIPTION` is not configured.
pub const DEFAULT_DESCRIPTION: &str = "Pago C2P";

/// Numeric `code` the bank returns for its own internal failures.
pub const BANK_INTERNAL_ERROR_CODE: i64 = 99999;

// ---------------------------------------------------------------------------
// Environment Variables
// ---------------------------------------------------------------------------

pub const ENV_MERCHANT_ID: &str = "MERCHANT_ID";
pub const ENV_TERMINAL_ID: &str = "TERMINAL_ID";
pub const ENV_CIPHER_KEY: &str = "CIPHER_KEY";
pub const ENV_CLIENT_ID: &str = "IBM_CLIENT_ID";
pub const ENV_GATEWAY_URL: &str = "C2P_URL";
pub const ENV_DESTINATION_ID: &str = "DESTINATION_ID";
pub const ENV_DESTINATION_PHONE: &str = "DESTINATION_PHONE";
pub const ENV_DESTINATION_BANK_CODE: &str = "DESTINATION_BANK_CODE";
pub const ENV_DESCRIPTION: &str = "PAYMENT_DESCRIPTION";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Startup configuration defects. All of them are fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .names.join(", "))]
    MissingVariables { names: Vec<&'static str> },

    #[error("cipher secret must not be empty")]
    EmptySecret,
}

// ---------------------------------------------------------------------------
// CipherConfig
// ---------------------------------------------------------------------------

/// The operator secret together with the key derived from it.
///
/// Built once at startup and never mutated. `Debug` prints neither the
/// secret nor the key.
#[derive(Clone)]
pub struct CipherConfig {
    secret: String,
    key: CipherKey,
}

impl CipherConfig {
    /// Derives the cipher key from `secret`.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        let key = derive_key(&secret)?;
        Ok(Self { secret, key })
    }

    /// The derived 16-byte key.
    pub fn key(&self) -> &CipherKey {
        &self.key
    }
}

impl fmt::Debug for CipherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherConfig")
            .field("secret", &format_args!("<{} bytes redacted>", self.secret.len()))
            .field("key", &self.key)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// RelaySettings / RelayConfig
// ---------------------------------------------------------------------------

/// Raw, possibly incomplete settings as read from the environment or CLI.
#[derive(Debug, Clone, Default)]
pub struct RelaySettings {
    pub merchant_id: Option<String>,
    pub terminal_id: Option<String>,
    pub cipher_key: Option<String>,
    pub client_id: Option<String>,
    pub gateway_url: Option<String>,
    pub destination_id: Option<String>,
    pub destination_phone: Option<String>,
    pub destination_bank_code: Option<String>,
    pub description: Option<String>,
}

/// Validated relay configuration.
///
/// Holds the merchant and terminal identity, the gateway endpoint and
/// credentials, the static destination account, and the cipher material.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub merchant_id: String,
    pub terminal_id: String,
    pub client_id: String,
    pub gateway_url: String,
    pub destination_id: String,
    pub destination_phone: String,
    pub destination_bank_code: String,
    pub description: String,
    pub cipher: CipherConfig,
}

impl RelayConfig {
    /// Validates `settings` and derives the cipher key.
    ///
    /// Blank values count as missing. Every missing variable is reported in
    /// a single error, in the order the operator would list them in `.env`.
    pub fn from_settings(settings: RelaySettings) -> Result<Self, ConfigError> {
        let RelaySettings {
            merchant_id,
            terminal_id,
            cipher_key,
            client_id,
            gateway_url,
            destination_id,
            destination_phone,
            destination_bank_code,
            description,
        } = settings;

        let mut missing = Vec::new();
        let mut require = |name: &'static str, value: Option<String>| -> String {
            match value.filter(|v| !v.trim().is_empty()) {
                Some(v) => v,
                None => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let merchant_id = require(ENV_MERCHANT_ID, merchant_id);
        let terminal_id = require(ENV_TERMINAL_ID, terminal_id);
        let cipher_key = require(ENV_CIPHER_KEY, cipher_key);
        let client_id = require(ENV_CLIENT_ID, client_id);
        let gateway_url = require(ENV_GATEWAY_URL, gateway_url);
        let destination_id = require(ENV_DESTINATION_ID, destination_id);
        let destination_phone = require(ENV_DESTINATION_PHONE, destination_phone);
        let destination_bank_code = require(ENV_DESTINATION_BANK_CODE, destination_bank_code);

        if !missing.is_empty() {
            return Err(ConfigError::MissingVariables { names: missing });
        }

        let description = description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

        Ok(Self {
            merchant_id,
            terminal_id,
            client_id,
            gateway_url,
            destination_id,
            destination_phone,
            destination_bank_code,
            description,
            cipher: CipherConfig::new(cipher_key)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_settings() -> RelaySettings {
        RelaySettings {
            merchant_id: Some("200284".into()),
            terminal_id: Some("abcde".into()),
            cipher_key: Some("A11103402525120190822HB01".into()),
            client_id: Some("81188330-c768-46fe-a378-ff3ac9e88824".into()),
            gateway_url: Some("https://gateway.example/c2p".into()),
            destination_id: Some("V18367443".into()),
            destination_phone: Some("584241513063".into()),
            destination_bank_code: Some("0105".into()),
            description: None,
        }
    }

    #[test]
    fn complete_settings_produce_config() {
        let config = RelayConfig::from_settings(full_settings()).unwrap();
        assert_eq!(config.merchant_id, "200284");
        assert_eq!(config.description, DEFAULT_DESCRIPTION);
        assert_eq!(config.cipher.key().as_bytes().len(), CIPHER_KEY_LENGTH);
    }

    #[test]
    fn every_missing_variable_is_named() {
        let mut settings = full_settings();
        settings.merchant_id = None;
        settings.cipher_key = Some("   ".into());
        settings.destination_bank_code = None;

        let err = RelayConfig::from_settings(settings).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingVariables {
                names: vec![ENV_MERCHANT_ID, ENV_CIPHER_KEY, ENV_DESTINATION_BANK_CODE],
            }
        );
        assert_eq!(
            err.to_string(),
            "missing required configuration: MERCHANT_ID, CIPHER_KEY, DESTINATION_BANK_CODE"
        );
    }

    #[test]
    fn empty_settings_name_all_eight_variables() {
        match RelayConfig::from_settings(RelaySettings::default()) {
            Err(ConfigError::MissingVariables { names }) => assert_eq!(names.len(), 8),
            other => panic!("expected MissingVariables, got {other:?}"),
        }
    }

    #[test]
    fn custom_description_is_kept() {
        let mut settings = full_settings();
        settings.description = Some("Compra tienda".into());
        let config = RelayConfig::from_settings(settings).unwrap();
        assert_eq!(config.description, "Compra tienda");
    }

    #[test]
    fn debug_output_redacts_cipher_material() {
        let config = RelayConfig::from_settings(full_settings()).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("A11103402525120190822HB01"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn gateway_constants_sanity() {
        assert_eq!(CIPHER_KEY_LENGTH, CIPHER_BLOCK_SIZE);
        assert_eq!(GATEWAY_TIMEOUT, Duration::from_secs(30));
        assert_eq!(CURRENCY_CODE, "VES");
    }
}
