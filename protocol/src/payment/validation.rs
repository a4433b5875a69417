//! Pre-flight validation of client payment requests.
//!
//! The checks run cheapest first and stop at the first failure:
//!
//! 1. body present and a JSON object
//! 2. `c2pPhone`, `purchaseKey`, `amount` present and non-empty
//! 3. field types
//! 4. `amount` is a finite, non-negative number
//!
//! A failure here is an expected outcome, not an exception: it comes back as
//! a [`ValidationError`] value and the caller answers 400.

use serde_json::{Map, Value};
use thiserror::Error;

/// Required request fields, in the order they are reported when missing.
pub const REQUIRED_FIELDS: [&str; 3] = ["c2pPhone", "purchaseKey", "amount"];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a payment request was refused before any cryptographic work.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no request data received")]
    EmptyBody,

    #[error("request body must be a JSON object")]
    MalformedBody,

    #[error("missing required fields: {}", .fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },

    #[error("field '{field}' must be a string")]
    InvalidType { field: &'static str },

    #[error("field 'amount' must be a valid number")]
    InvalidAmount,

    #[error("field 'amount' must not be negative")]
    NegativeAmount,
}

// ---------------------------------------------------------------------------
// PaymentRequest
// ---------------------------------------------------------------------------

/// A validated C2P payment request.
///
/// Lives for one HTTP request. `raw` keeps the body exactly as submitted so
/// the transaction record can store it.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    /// Payer's phone number, e.g. `584142591177`.
    pub c2p_phone: String,
    /// One-time purchase authorization key issued by the payer's bank.
    pub purchase_key: String,
    /// Amount in bolívares.
    pub amount: f64,
    /// Storefront that sent the customer here.
    pub origin: Option<String>,
    /// Opaque checkout metadata, stored verbatim.
    pub checkout_data: Option<Value>,
    raw: Value,
}

impl PaymentRequest {
    /// The body exactly as submitted, for the transaction record.
    pub fn request_data(&self) -> &Value {
        &self.raw
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validates a raw HTTP body.
///
/// # Example
///
/// ```
/// use c2p_protocol::payment::{validate, ValidationError};
///
/// let err = validate(b"{}").unwrap_err();
/// assert!(matches!(err, ValidationError::MissingFields { .. }));
///
/// let req = validate(br#"{"c2pPhone":"584142591177","purchaseKey":"1234","amount":"10.50"}"#)
///     .unwrap();
/// assert_eq!(req.amount, 10.5);
/// ```
pub fn validate(body: &[u8]) -> Result<PaymentRequest, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ValidationError::EmptyBody);
    }
    let value: Value = serde_json::from_slice(body).map_err(|_| ValidationError::MalformedBody)?;
    validate_value(value)
}

/// Validates an already-parsed JSON body.
pub fn validate_value(value: Value) -> Result<PaymentRequest, ValidationError> {
    let obj = match &value {
        Value::Null => return Err(ValidationError::EmptyBody),
        Value::Object(obj) => obj,
        _ => return Err(ValidationError::MalformedBody),
    };

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !is_present(obj, field))
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields { fields: missing });
    }

    let c2p_phone = required_string(obj, "c2pPhone")?;
    let purchase_key = required_string(obj, "purchaseKey")?;
    let amount = parse_amount(&obj["amount"])?;

    let origin = match obj.get("origin") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(ValidationError::InvalidType { field: "origin" }),
    };

    let checkout_data = match obj.get("checkoutData") {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.clone()),
    };

    Ok(PaymentRequest {
        c2p_phone,
        purchase_key,
        amount,
        origin,
        checkout_data,
        raw: value,
    })
}

/// Absent, `null` and blank strings all count as missing.
fn is_present(obj: &Map<String, Value>, field: &str) -> bool {
    match obj.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

fn required_string(
    obj: &Map<String, Value>,
    field: &'static str,
) -> Result<String, ValidationError> {
    match obj.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(ValidationError::InvalidType { field }),
    }
}

/// Accepts a JSON number or a numeric string such as `"10.50"`.
fn parse_amount(value: &Value) -> Result<f64, ValidationError> {
    let amount = match value {
        Value::Number(n) => n.as_f64().ok_or(ValidationError::InvalidAmount)?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::InvalidAmount)?,
        _ => return Err(ValidationError::InvalidAmount),
    };

    if !amount.is_finite() {
        return Err(ValidationError::InvalidAmount);
    }
    if amount < 0.0 {
        return Err(ValidationError::NegativeAmount);
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn valid_request_with_string_amount() {
        let req = validate(&body(json!({
            "c2pPhone": "584142591177",
            "purchaseKey": "1234",
            "amount": "10.50",
            "origin": "tienda-web",
            "checkoutData": { "items": [{ "sku": "A1", "qty": 2 }] }
        })))
        .unwrap();

        assert_eq!(req.c2p_phone, "584142591177");
        assert_eq!(req.purchase_key, "1234");
        assert_eq!(req.amount, 10.5);
        assert_eq!(req.origin.as_deref(), Some("tienda-web"));
        assert_eq!(req.checkout_data.unwrap()["items"][0]["sku"], "A1");
    }

    #[test]
    fn numeric_amount_is_accepted() {
        let req = validate(&body(json!({
            "c2pPhone": "584142591177",
            "purchaseKey": "1234",
            "amount": 150
        })))
        .unwrap();
        assert_eq!(req.amount, 150.0);
        assert!(req.origin.is_none());
        assert!(req.checkout_data.is_none());
    }

    #[test]
    fn empty_object_lists_all_required_fields() {
        let err = validate(b"{}").unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields {
                fields: vec!["c2pPhone", "purchaseKey", "amount"],
            }
        );
        assert_eq!(
            err.to_string(),
            "missing required fields: c2pPhone, purchaseKey, amount"
        );
    }

    #[test]
    fn blank_and_null_fields_count_as_missing() {
        let err = validate(&body(json!({
            "c2pPhone": "  ",
            "purchaseKey": null,
            "amount": "5"
        })))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields {
                fields: vec!["c2pPhone", "purchaseKey"],
            }
        );
    }

    #[test]
    fn non_numeric_amount_fails_on_format() {
        let err = validate(&body(json!({
            "c2pPhone": "04121234567",
            "purchaseKey": "1234",
            "amount": "abc"
        })))
        .unwrap_err();
        assert_eq!(err, ValidationError::InvalidAmount);
    }

    #[test]
    fn non_finite_and_negative_amounts_are_rejected() {
        for (amount, expected) in [
            (json!("NaN"), ValidationError::InvalidAmount),
            (json!("inf"), ValidationError::InvalidAmount),
            (json!(true), ValidationError::InvalidAmount),
            (json!("-3.00"), ValidationError::NegativeAmount),
            (json!(-1), ValidationError::NegativeAmount),
        ] {
            let err = validate(&body(json!({
                "c2pPhone": "584142591177",
                "purchaseKey": "1234",
                "amount": amount
            })))
            .unwrap_err();
            assert_eq!(err, expected);
        }
    }

    #[test]
    fn missing_fields_take_priority_over_amount_format() {
        let err = validate(&body(json!({ "amount": "abc" }))).unwrap_err();
        assert!(matches!(err, ValidationError::MissingFields { .. }));
    }

    #[test]
    fn empty_and_unparseable_bodies() {
        assert_eq!(validate(b""), Err(ValidationError::EmptyBody));
        assert_eq!(validate(b"  \n"), Err(ValidationError::EmptyBody));
        assert_eq!(validate(b"null"), Err(ValidationError::EmptyBody));
        assert_eq!(validate(b"{not json"), Err(ValidationError::MalformedBody));
        assert_eq!(validate(b"[1,2,3]"), Err(ValidationError::MalformedBody));
    }

    #[test]
    fn phone_must_be_a_string() {
        let err = validate(&body(json!({
            "c2pPhone": 584142591177u64,
            "purchaseKey": "1234",
            "amount": "1"
        })))
        .unwrap_err();
        assert_eq!(err, ValidationError::InvalidType { field: "c2pPhone" });
    }

    #[test]
    fn origin_must_be_a_string_when_present() {
        let err = validate(&body(json!({
            "c2pPhone": "584142591177",
            "purchaseKey": "1234",
            "amount": "1",
            "origin": 42
        })))
        .unwrap_err();
        assert_eq!(err, ValidationError::InvalidType { field: "origin" });
    }

    #[test]
    fn request_data_is_the_submitted_body() {
        let submitted = json!({
            "c2pPhone": "584142591177",
            "purchaseKey": "98765432",
            "amount": "20",
            "extra": { "note": "kept" }
        });
        let req = validate(&body(submitted.clone())).unwrap();
        assert_eq!(req.request_data(), &submitted);
    }

    #[test]
    fn surrounding_whitespace_is_preserved() {
        let req = validate(&body(json!({
            "c2pPhone": " 0412 ",
            "purchaseKey": " 12 34 ",
            "amount": "1"
        })))
        .unwrap();
        assert_eq!(req.c2p_phone, " 0412 ");
        assert_eq!(req.purchase_key, " 12 34 ");
        assert_eq!(req.request_data()["c2pPhone"], " 0412 ");
    }
}
