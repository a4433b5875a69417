//! # Payment Service
//!
//! The request path of the relay, from raw client body to stored record.
//!
//! ```text
//! validate ─► build_payload ─► gateway.submit ─► interpret_reply
//!                                                  ├─ Accepted ─► record "completed" ─► Ok(receipt)
//!                                                  └─ Rejected ─► record "rejected"  ─► Err(GatewayRejection)
//! ```
//!
//! The gateway call is the only suspension point. Nothing is retried; the
//! client decides whether to try again.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::RelayConfig;
use crate::crypto::EncryptionError;
use crate::gateway::{interpret_reply, BankRejection, GatewayError, GatewayOutcome, PaymentGateway};
use crate::payment::{build_payload, validate, ValidationError};
use crate::storage::{DbError, RelayDB, TransactionRecord};

/// Message returned to the client on success when the bank sends none.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Payment processed successfully.";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Everything that can stop a payment.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("cipher failure: {0}")]
    InvalidKey(#[from] EncryptionError),

    #[error("gateway unreachable: {0}")]
    GatewayTransport(#[from] GatewayError),

    #[error("gateway rejected payment (HTTP {}): {}", .rejection.status, .rejection.message)]
    GatewayRejection {
        rejection: BankRejection,
        /// Id of the stored `rejected` record, if it could be written.
        transaction_id: Option<String>,
    },

    #[error("persistence failure: {0}")]
    Persistence(#[from] DbError),
}

// ---------------------------------------------------------------------------
// PaymentReceipt
// ---------------------------------------------------------------------------

/// What the client gets back for an accepted payment.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReceipt {
    pub transaction_id: String,
    pub message: String,
    pub bank_data: Value,
    /// Wall-clock time of the gateway round-trip.
    pub gateway_latency: Duration,
}

// ---------------------------------------------------------------------------
// PaymentService
// ---------------------------------------------------------------------------

/// Validates, encrypts, forwards and records C2P payments.
///
/// Cheap to clone: everything behind `Arc`.
#[derive(Clone)]
pub struct PaymentService {
    config: Arc<RelayConfig>,
    gateway: Arc<dyn PaymentGateway>,
    db: Arc<RelayDB>,
}

impl PaymentService {
    pub fn new(
        config: Arc<RelayConfig>,
        gateway: Arc<dyn PaymentGateway>,
        db: Arc<RelayDB>,
    ) -> Self {
        Self {
            config,
            gateway,
            db,
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn db(&self) -> &RelayDB {
        &self.db
    }

    /// Runs one payment from the raw HTTP body.
    pub async fn create_payment(&self, body: &[u8]) -> Result<PaymentReceipt, RelayError> {
        let request = validate(body)?;
        let payload = build_payload(&request, &self.config)?;

        debug!(
            payload = %serde_json::to_string(&payload).unwrap_or_default(),
            "gateway payload built"
        );

        let started = Instant::now();
        let reply = self.gateway.submit(&payload).await.map_err(|e| {
            error!(error = %e, "gateway transport failure");
            e
        })?;
        let gateway_latency = started.elapsed();

        match interpret_reply(reply) {
            GatewayOutcome::Accepted(bank_data) => {
                let record = TransactionRecord::completed(&request, bank_data.clone());
                self.db.insert_record(&record).map_err(|e| {
                    error!(error = %e, "failed to persist completed payment");
                    e
                })?;

                let message = bank_data
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_SUCCESS_MESSAGE)
                    .to_string();

                info!(
                    transaction_id = %record.internal_id,
                    origin = record.origin.as_deref().unwrap_or("-"),
                    latency_ms = gateway_latency.as_millis() as u64,
                    "payment completed"
                );

                Ok(PaymentReceipt {
                    transaction_id: record.internal_id,
                    message,
                    bank_data,
                    gateway_latency,
                })
            }
            GatewayOutcome::Rejected(rejection) => {
                warn!(
                    status = rejection.status,
                    body = %rejection.body,
                    "gateway rejected payment"
                );

                // The rejection is the outcome the client needs to see; a
                // failed audit write is logged but does not replace it.
                let record = TransactionRecord::rejected(&request, rejection.body.clone());
                let transaction_id = match self.db.insert_record(&record) {
                    Ok(()) => Some(record.internal_id),
                    Err(e) => {
                        error!(error = %e, "failed to persist rejected payment");
                        None
                    }
                };

                Err(RelayError::GatewayRejection {
                    rejection,
                    transaction_id,
                })
            }
        }
    }

    /// Looks up a stored record.
    pub fn payment_details(
        &self,
        transaction_id: &str,
    ) -> Result<Option<TransactionRecord>, RelayError> {
        Ok(self.db.get_record(transaction_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelaySettings;
    use crate::gateway::{GatewayReply, BANK_INTERNAL_ERROR_MESSAGE};
    use crate::payment::GatewayPayload;
    use crate::storage::RecordStatus;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Returns a canned reply and remembers what it was sent.
    struct StubGateway {
        reply: Result<GatewayReply, fn() -> GatewayError>,
        seen: Mutex<Vec<GatewayPayload>>,
    }

    impl StubGateway {
        fn replying(status: u16, body: Value) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(GatewayReply::new(status, body.to_string())),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing(err: fn() -> GatewayError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(err),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PaymentGateway for StubGateway {
        async fn submit(&self, payload: &GatewayPayload) -> Result<GatewayReply, GatewayError> {
            self.seen.lock().unwrap().push(payload.clone());
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn config() -> Arc<RelayConfig> {
        Arc::new(
            RelayConfig::from_settings(RelaySettings {
                merchant_id: Some("200284".into()),
                terminal_id: Some("abcde".into()),
                cipher_key: Some("A11103402525120190822HB01".into()),
                client_id: Some("client-123".into()),
                gateway_url: Some("http://unused".into()),
                destination_id: Some("V18367443".into()),
                destination_phone: Some("584241513063".into()),
                destination_bank_code: Some("0105".into()),
                description: None,
            })
            .unwrap(),
        )
    }

    fn service(gateway: Arc<StubGateway>) -> PaymentService {
        let db = Arc::new(RelayDB::open_temporary().unwrap());
        PaymentService::new(config(), gateway, db)
    }

    fn valid_body() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "c2pPhone": "584142591177",
            "purchaseKey": "1234",
            "amount": "10.50",
            "origin": "tienda",
            "checkoutData": { "cart": "xyz" }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn accepted_payment_is_recorded() {
        let gateway =
            StubGateway::replying(200, json!({ "reference": "000123", "message": "Aprobado" }));
        let svc = service(Arc::clone(&gateway));

        let receipt = svc.create_payment(&valid_body()).await.unwrap();
        assert_eq!(receipt.message, "Aprobado");
        assert_eq!(receipt.bank_data["reference"], "000123");

        let record = svc.payment_details(&receipt.transaction_id).unwrap().unwrap();
        assert_eq!(record.status, RecordStatus::Completed);
        assert_eq!(record.bank_response, receipt.bank_data);
        assert_eq!(record.origin.as_deref(), Some("tienda"));
        assert_eq!(record.checkout_data, Some(json!({ "cart": "xyz" })));
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn success_message_defaults_when_bank_sends_none() {
        let svc = service(StubGateway::replying(201, json!({ "reference": "1" })));
        let receipt = svc.create_payment(&valid_body()).await.unwrap();
        assert_eq!(receipt.message, DEFAULT_SUCCESS_MESSAGE);
    }

    #[tokio::test]
    async fn validation_failure_never_reaches_gateway() {
        let gateway = StubGateway::replying(200, json!({}));
        let svc = service(Arc::clone(&gateway));

        let err = svc.create_payment(b"{}").await.unwrap_err();
        assert!(matches!(err, RelayError::Validation(ValidationError::MissingFields { .. })));
        assert_eq!(gateway.calls(), 0);
        assert_eq!(svc.db().record_count(), 0);
    }

    #[tokio::test]
    async fn rejection_is_recorded_and_reported() {
        let svc = service(StubGateway::replying(400, json!({ "code": 99999 })));

        match svc.create_payment(&valid_body()).await.unwrap_err() {
            RelayError::GatewayRejection {
                rejection,
                transaction_id,
            } => {
                assert_eq!(rejection.status, 400);
                assert_eq!(rejection.message, BANK_INTERNAL_ERROR_MESSAGE);
                let id = transaction_id.expect("rejected attempt is stored");
                let record = svc.payment_details(&id).unwrap().unwrap();
                assert_eq!(record.status, RecordStatus::Rejected);
                assert_eq!(record.bank_response, json!({ "code": 99999 }));
            }
            other => panic!("expected GatewayRejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_failure_is_not_recorded() {
        let svc = service(StubGateway::failing(|| GatewayError::Timeout));

        let err = svc.create_payment(&valid_body()).await.unwrap_err();
        assert!(matches!(err, RelayError::GatewayTransport(GatewayError::Timeout)));
        assert_eq!(svc.db().record_count(), 0);
    }

    #[tokio::test]
    async fn gateway_receives_encrypted_fields() {
        let gateway = StubGateway::replying(200, json!({}));
        let svc = service(Arc::clone(&gateway));
        svc.create_payment(&valid_body()).await.unwrap();

        let seen = gateway.seen.lock().unwrap();
        let tx = &seen[0].c2p_payment;
        assert_eq!(tx.amount, 10.5);
        assert_eq!(tx.currency, "VES");
        assert_ne!(tx.origin_phone, "584142591177");
        assert_ne!(tx.purchase_key, "1234");
        assert_ne!(tx.destination_id, "V18367443");
    }
}
