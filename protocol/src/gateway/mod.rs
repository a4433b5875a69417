//! # Bank Gateway
//!
//! The outbound half of the relay.
//!
//! ```text
//! client.rs   - HttpGateway: reqwest client with the fixed timeout and headers
//! response.rs - Classifying replies and extracting user-facing bank errors
//! ```
//!
//! [`PaymentGateway`] is the seam between the payment service and the
//! network. The node wires in [`HttpGateway`]; tests substitute stubs.

pub mod client;
pub mod response;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::payment::GatewayPayload;

pub use client::HttpGateway;
pub use response::{
    bank_error_message, client_status, interpret_reply, BankRejection, GatewayOutcome,
    BANK_INTERNAL_ERROR_MESSAGE, GENERIC_BANK_ERROR_MESSAGE,
};

/// No usable response from the gateway at all.
///
/// Distinct from a rejection: the bank never got to say no.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request timed out")]
    Timeout,

    #[error("could not connect to gateway: {0}")]
    Connect(String),

    #[error("gateway transport error: {0}")]
    Transport(String),
}

/// What came back over the wire, before interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayReply {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body, if the body was JSON.
    pub body: Option<Value>,
    /// Raw body text, kept for server-side logs.
    pub raw: String,
}

impl GatewayReply {
    /// Builds a reply from a status and body text, parsing JSON when possible.
    pub fn new(status: u16, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let body = serde_json::from_str(&raw).ok();
        Self { status, body, raw }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Submits a payload to the bank.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn submit(&self, payload: &GatewayPayload) -> Result<GatewayReply, GatewayError>;
}
