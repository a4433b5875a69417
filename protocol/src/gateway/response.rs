//! Interpreting what the bank sent back.
//!
//! The gateway is not consistent about how it reports failures. Depending on
//! the path and the error it answers with a numeric `code`, a `message`, an
//! `error` string, a `detail`, or an `errors` array, sometimes under HTTP 200.
//! This module turns all of that into one of two outcomes and, for
//! rejections, one user-facing sentence.

use serde_json::Value;

use super::GatewayReply;
use crate::config::BANK_INTERNAL_ERROR_CODE;

/// Shown when the bank reports its internal-error sentinel code.
pub const BANK_INTERNAL_ERROR_MESSAGE: &str =
    "The bank reported an internal error. Please try again in a few minutes.";

/// Shown when the bank's error body says nothing we can use.
pub const GENERIC_BANK_ERROR_MESSAGE: &str = "The payment could not be processed by the bank.";

/// A structured "no" from the bank.
#[derive(Debug, Clone, PartialEq)]
pub struct BankRejection {
    /// Upstream HTTP status.
    pub status: u16,
    /// User-facing message extracted from the body.
    pub message: String,
    /// The body as received, or the raw text as a JSON string when it was
    /// not JSON.
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayOutcome {
    /// 2xx with a JSON body and no error structure.
    Accepted(Value),
    Rejected(BankRejection),
}

fn error_code(body: &Value) -> Option<i64> {
    match body.get("code")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// A non-blank string or a non-empty object. `null`, `false`, `""` and `{}`
/// are placeholders some gateway paths send on success.
fn is_error_entry(value: &Value) -> bool {
    match value {
        Value::String(s) => !s.trim().is_empty(),
        Value::Object(obj) => !obj.is_empty(),
        _ => false,
    }
}

/// Whether a body carries a bank error, regardless of HTTP status.
pub fn has_bank_error(body: &Value) -> bool {
    if error_code(body) == Some(BANK_INTERNAL_ERROR_CODE) {
        return true;
    }
    if body.get("error").is_some_and(is_error_entry) {
        return true;
    }
    body.get("errors")
        .and_then(Value::as_array)
        .is_some_and(|errors| errors.iter().any(is_error_entry))
}

/// Picks the user-facing message out of a bank error body.
///
/// Priority: internal-error code, `message`, `error`, `detail`, first entry
/// of `errors` (a string or an object's `message`), then a generic fallback.
pub fn bank_error_message(body: &Value) -> String {
    if error_code(body) == Some(BANK_INTERNAL_ERROR_CODE) {
        return BANK_INTERNAL_ERROR_MESSAGE.to_string();
    }

    let found = non_empty_str(body.get("message"))
        .or_else(|| non_empty_str(body.get("error")))
        .or_else(|| non_empty_str(body.get("detail")))
        .or_else(|| {
            let first = body.get("errors")?.as_array()?.first()?;
            match first {
                Value::String(_) => non_empty_str(Some(first)),
                Value::Object(_) => non_empty_str(first.get("message")),
                _ => None,
            }
        });

    found
        .map(str::to_string)
        .unwrap_or_else(|| GENERIC_BANK_ERROR_MESSAGE.to_string())
}

/// Classifies a reply as accepted or rejected.
pub fn interpret_reply(reply: GatewayReply) -> GatewayOutcome {
    let GatewayReply { status, body, raw } = reply;

    match body {
        Some(body) if (200..300).contains(&status) && !has_bank_error(&body) => {
            GatewayOutcome::Accepted(body)
        }
        Some(body) => GatewayOutcome::Rejected(BankRejection {
            status,
            message: bank_error_message(&body),
            body,
        }),
        None => GatewayOutcome::Rejected(BankRejection {
            status,
            message: GENERIC_BANK_ERROR_MESSAGE.to_string(),
            body: Value::String(raw),
        }),
    }
}

/// HTTP status to answer the web client with for a rejection.
///
/// Client errors are mirrored, except authentication failures and
/// 404/405/408, which point at the relay's own endpoint configuration or
/// connectivity rather than at the payment. A bank error under 2xx becomes
/// 402. Everything else is 503.
pub fn client_status(upstream: u16) -> u16 {
    match upstream {
        401 | 403 | 404 | 405 | 407 | 408 => 503,
        400..=499 => upstream,
        200..=299 => 402,
        _ => 503,
    }
}
