//! The persisted record of one gateway round-trip.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::payment::PaymentRequest;

/// Terminal outcome of a payment attempt that reached the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// The bank accepted the payment.
    Completed,
    /// The bank answered with a structured failure.
    Rejected,
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// A stored payment attempt.
///
/// Serialized field names match what the receipt page reads
/// (`internalId`, `requestData`, `bankResponse`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// UUID v4, assigned once in [`TransactionRecord::new`].
    pub internal_id: String,
    pub status: RecordStatus,
    /// The request body as the client submitted it.
    pub request_data: Value,
    /// The bank's response body.
    pub bank_response: Value,
    pub origin: Option<String>,
    pub checkout_data: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Creates a record with a fresh identifier.
    pub fn new(status: RecordStatus, request: &PaymentRequest, bank_response: Value) -> Self {
        Self {
            internal_id: Uuid::new_v4().to_string(),
            status,
            request_data: request.request_data().clone(),
            bank_response,
            origin: request.origin.clone(),
            checkout_data: request.checkout_data.clone(),
            created_at: Utc::now(),
        }
    }

    pub fn completed(request: &PaymentRequest, bank_response: Value) -> Self {
        Self::new(RecordStatus::Completed, request, bank_response)
    }

    pub fn rejected(request: &PaymentRequest, bank_response: Value) -> Self {
        Self::new(RecordStatus::Rejected, request, bank_response)
    }
}
