//! Gateway payload construction.
//!
//! [`build_payload`] is the only place where request data meets the cipher.
//! Three fields are encrypted, each with its own call under the same key;
//! everything else is copied in plaintext from the request or from
//! [`RelayConfig`].

use serde::{Deserialize, Serialize};

use super::validation::PaymentRequest;
use crate::config::{RelayConfig, CURRENCY_CODE};
use crate::crypto::encryption::{encrypt, EncryptionError};

/// Top-level body of `POST <gatewayURL>`.
///
/// Field names and nesting follow the gateway's schema exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayPayload {
    pub merchant_id: String,
    pub terminal_id: String,
    pub c2p_payment: C2pPayment,
}

/// The nested transaction object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct C2pPayment {
    /// Never encrypted.
    pub amount: f64,
    /// Encrypted merchant account id.
    pub destination_id: String,
    pub destination_phone: String,
    pub destination_bank_code: String,
    /// Encrypted payer phone.
    pub origin_phone: String,
    /// Encrypted purchase authorization key.
    pub purchase_key: String,
    pub currency: String,
    pub description: String,
}

/// Builds the gateway payload for a validated request.
///
/// Pure: no network, no persistence, no logging of plaintext fields.
///
/// # Errors
///
/// Only [`EncryptionError::InvalidKeyLength`], which cannot happen with a key
/// obtained from [`CipherConfig`](crate::config::CipherConfig).
pub fn build_payload(
    request: &PaymentRequest,
    config: &RelayConfig,
) -> Result<GatewayPayload, EncryptionError> {
    let key = config.cipher.key().as_bytes();

    let destination_id = encrypt(key, &config.destination_id)?;
    let origin_phone = encrypt(key, &request.c2p_phone)?;
    let purchase_key = encrypt(key, &request.purchase_key)?;

    Ok(GatewayPayload {
        merchant_id: config.merchant_id.clone(),
        terminal_id: config.terminal_id.clone(),
        c2p_payment: C2pPayment {
            amount: request.amount,
            destination_id,
            destination_phone: config.destination_phone.clone(),
            destination_bank_code: config.destination_bank_code.clone(),
            origin_phone,
            purchase_key,
            currency: CURRENCY_CODE.to_string(),
            description: config.description.clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelaySettings;
    use crate::crypto::encryption::decrypt;
    use crate::payment::validation::validate;
    use serde_json::json;

    fn test_config() -> RelayConfig {
        RelayConfig::from_settings(RelaySettings {
            merchant_id: Some("200284".into()),
            terminal_id: Some("abcde".into()),
            cipher_key: Some("A11103402525120190822HB01".into()),
            client_id: Some("client-123".into()),
            gateway_url: Some("https://gateway.example/c2p".into()),
            destination_id: Some("V18367443".into()),
            destination_phone: Some("584241513063".into()),
            destination_bank_code: Some("0105".into()),
            description: None,
        })
        .unwrap()
    }

    fn test_request() -> PaymentRequest {
        validate(
            &serde_json::to_vec(&json!({
                "c2pPhone": "584142591177",
                "purchaseKey": "1234",
                "amount": "10.50"
            }))
            .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn payload_carries_plain_and_encrypted_fields() {
        let config = test_config();
        let payload = build_payload(&test_request(), &config).unwrap();

        assert_eq!(payload.merchant_id, "200284");
        assert_eq!(payload.terminal_id, "abcde");

        let tx = &payload.c2p_payment;
        assert_eq!(tx.amount, 10.5);
        assert_eq!(tx.currency, "VES");
        assert_eq!(tx.destination_phone, "584241513063");
        assert_eq!(tx.destination_bank_code, "0105");
        assert_eq!(tx.description, "Pago C2P");

        assert_ne!(tx.destination_id, "V18367443");
        assert_ne!(tx.origin_phone, "584142591177");
        assert_ne!(tx.purchase_key, "1234");
    }

    #[test]
    fn encrypted_fields_decrypt_to_inputs() {
        let config = test_config();
        let key = config.cipher.key().as_bytes();
        let payload = build_payload(&test_request(), &config).unwrap();

        let tx = &payload.c2p_payment;
        assert_eq!(decrypt(key, &tx.destination_id).unwrap(), "V18367443");
        assert_eq!(decrypt(key, &tx.origin_phone).unwrap(), "584142591177");
        assert_eq!(decrypt(key, &tx.purchase_key).unwrap(), "1234");
    }

    #[test]
    fn padded_inputs_are_encrypted_verbatim() {
        let config = test_config();
        let key = config.cipher.key().as_bytes();
        let request = validate(
            &serde_json::to_vec(&json!({
                "c2pPhone": " 0412 ",
                "purchaseKey": " 1234 ",
                "amount": "1"
            }))
            .unwrap(),
        )
        .unwrap();
        let payload = build_payload(&request, &config).unwrap();

        let tx = &payload.c2p_payment;
        assert_eq!(decrypt(key, &tx.origin_phone).unwrap(), " 0412 ");
        assert_eq!(decrypt(key, &tx.purchase_key).unwrap(), " 1234 ");
        assert_eq!(request.request_data()["purchaseKey"], " 1234 ");
    }

    #[test]
    fn payload_is_deterministic() {
        let config = test_config();
        let a = build_payload(&test_request(), &config).unwrap();
        let b = build_payload(&test_request(), &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn wire_shape_matches_gateway_schema() {
        let payload = build_payload(&test_request(), &test_config()).unwrap();
        let wire = serde_json::to_value(&payload).unwrap();

        let top: Vec<&str> = wire.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(top.len(), 3);
        for key in ["merchant_id", "terminal_id", "c2p_payment"] {
            assert!(top.contains(&key), "missing {key}");
        }

        let tx = wire["c2p_payment"].as_object().unwrap();
        for key in [
            "amount",
            "destination_id",
            "destination_phone",
            "destination_bank_code",
            "origin_phone",
            "purchase_key",
            "currency",
            "description",
        ] {
            assert!(tx.contains_key(key), "missing c2p_payment.{key}");
        }
        assert_eq!(tx.len(), 8);
        assert!(wire["c2p_payment"]["amount"].is_f64());
        assert_eq!(wire["c2p_payment"]["amount"], json!(10.5));
    }

    #[test]
    fn optional_metadata_does_not_change_shape() {
        let config = test_config();
        let with_meta = validate(
            &serde_json::to_vec(&json!({
                "c2pPhone": "584142591177",
                "purchaseKey": "1234",
                "amount": "10.50",
                "origin": "tienda",
                "checkoutData": { "cart": "abc" }
            }))
            .unwrap(),
        )
        .unwrap();

        let a = build_payload(&test_request(), &config).unwrap();
        let b = build_payload(&with_meta, &config).unwrap();
        assert_eq!(a, b);
    }
}
