//! # Payment API
//!
//! Builds the axum router that web checkouts talk to. All endpoints share
//! application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                                 | Description                   |
//! |--------|--------------------------------------|-------------------------------|
//! | GET    | `/`                                  | Banner                        |
//! | GET    | `/api`                               | Liveness banner               |
//! | POST   | `/api/create-c2p-payment`            | Submit a C2P payment          |
//! | GET    | `/api/payment-details/:transactionId`| Stored record for a payment   |
//!
//! Error bodies are always `{"error": "..."}` with a message safe to show an
//! end user. Internal error text goes to the log only.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use c2p_protocol::gateway::client_status;
use c2p_protocol::{PaymentReceipt, PaymentService, RelayError};

use crate::metrics::SharedMetrics;

/// Client-facing text for a gateway that never answered.
pub const GATEWAY_UNAVAILABLE_MESSAGE: &str = "Could not communicate with the payment service.";

/// Client-facing text for failures inside the relay.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal error while processing the payment.";

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone: everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub service: PaymentService,
    pub metrics: SharedMetrics,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, and tracing.
pub fn create_router(state: AppState) -> Router {
    // Checkouts are served from other origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/api", get(api_index_handler))
        .route("/api/create-c2p-payment", post(create_payment_handler))
        .route(
            "/api/payment-details/:transaction_id",
            get(payment_details_handler),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub status: &'static str,
    pub transaction_id: String,
    pub bank_data: Value,
    pub message: String,
}

impl From<PaymentReceipt> for PaymentResponse {
    fn from(receipt: PaymentReceipt) -> Self {
        Self {
            status: "success",
            transaction_id: receipt.transaction_id,
            bank_data: receipt.bank_data,
            message: receipt.message,
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index_handler() -> &'static str {
    "C2P payment relay"
}

async fn api_index_handler() -> &'static str {
    "C2P payment relay API is running."
}

/// `POST /api/create-c2p-payment`
///
/// Takes the raw body so that empty and malformed payloads get the same
/// `{"error"}` shape as every other validation failure.
async fn create_payment_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let metrics = &state.metrics;

    match state.service.create_payment(&body).await {
        Ok(receipt) => {
            metrics.payments_completed_total.inc();
            metrics
                .gateway_latency_seconds
                .observe(receipt.gateway_latency.as_secs_f64());
            (StatusCode::OK, Json(PaymentResponse::from(receipt))).into_response()
        }
        Err(RelayError::Validation(e)) => {
            metrics.payments_invalid_total.inc();
            warn!(error = %e, "payment request rejected");
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
        Err(RelayError::GatewayRejection {
            rejection,
            transaction_id,
        }) => {
            metrics.payments_rejected_total.inc();
            let status = StatusCode::from_u16(client_status(rejection.status))
                .unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
            (
                status,
                Json(json!({
                    "error": rejection.message,
                    "transactionId": transaction_id,
                })),
            )
                .into_response()
        }
        Err(RelayError::GatewayTransport(_)) => {
            metrics.gateway_failures_total.inc();
            error_response(StatusCode::SERVICE_UNAVAILABLE, GATEWAY_UNAVAILABLE_MESSAGE)
        }
        Err(e @ (RelayError::InvalidKey(_) | RelayError::Persistence(_))) => {
            metrics.internal_errors_total.inc();
            error!(error = %e, "payment failed inside the relay");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    }
}

/// `GET /api/payment-details/:transactionId`
///
/// Returns the stored record as-is, or 404.
async fn payment_details_handler(
    Path(transaction_id): Path<String>,
    State(state): State<AppState>,
) -> Response {
    match state.service.payment_details(&transaction_id) {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Transaction not found."),
        Err(e) => {
            state.metrics.internal_errors_total.inc();
            error!(error = %e, %transaction_id, "failed to load payment record");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    }
}
