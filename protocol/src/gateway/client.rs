//! HTTPS client for the bank's C2P endpoint.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, info};

use super::{GatewayError, GatewayReply, PaymentGateway};
use crate::config::{RelayConfig, CLIENT_ID_HEADER, GATEWAY_TIMEOUT};
use crate::payment::GatewayPayload;

/// [`PaymentGateway`] over HTTPS.
///
/// One `reqwest::Client` is built up front and reused, so connections are
/// pooled across payments. The timeout covers the whole round-trip and is
/// the same for every request.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    url: String,
    client_id: String,
}

impl HttpGateway {
    /// Client with the standard [`GATEWAY_TIMEOUT`].
    pub fn new(url: impl Into<String>, client_id: impl Into<String>) -> Result<Self, GatewayError> {
        Self::with_timeout(url, client_id, GATEWAY_TIMEOUT)
    }

    pub fn with_timeout(
        url: impl Into<String>,
        client_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            client_id: client_id.into(),
        })
    }

    /// Client pointed at the configured gateway URL with the configured id.
    pub fn from_config(config: &RelayConfig) -> Result<Self, GatewayError> {
        Self::new(config.gateway_url.clone(), config.client_id.clone())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn classify(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else if err.is_connect() {
        GatewayError::Connect(err.to_string())
    } else {
        GatewayError::Transport(err.to_string())
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    async fn submit(&self, payload: &GatewayPayload) -> Result<GatewayReply, GatewayError> {
        info!(url = %self.url, amount = payload.c2p_payment.amount, "sending C2P request to gateway");
        let started = Instant::now();

        let response = self
            .client
            .post(&self.url)
            .header(CLIENT_ID_HEADER, &self.client_id)
            .json(payload)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let raw = response.text().await.map_err(classify)?;

        debug!(
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "gateway replied"
        );
        Ok(GatewayReply::new(status, raw))
    }
}
