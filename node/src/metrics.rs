//! # Prometheus Metrics
//!
//! Payment outcome counters and gateway latency, served at `/metrics` on
//! the metrics port. Everything lives in a dedicated registry with the
//! `c2p` prefix.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use std::sync::Arc;

/// Metric handles shared by the request handlers.
#[derive(Clone)]
pub struct RelayMetrics {
    registry: Registry,
    /// Payments the bank accepted.
    pub payments_completed_total: IntCounter,
    /// Payments the bank answered with an error.
    pub payments_rejected_total: IntCounter,
    /// Requests refused before reaching the bank.
    pub payments_invalid_total: IntCounter,
    /// Gateway calls that produced no response (timeout, connect, transport).
    pub gateway_failures_total: IntCounter,
    /// Requests that failed inside the relay (cipher, storage).
    pub internal_errors_total: IntCounter,
    /// Round-trip time of answered gateway calls.
    pub gateway_latency_seconds: Histogram,
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, prometheus::Error> {
    let c = IntCounter::new(name, help)?;
    registry.register(Box::new(c.clone()))?;
    Ok(c)
}

impl RelayMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("c2p".into()), None)?;

        let payments_completed_total = counter(
            &registry,
            "payments_completed_total",
            "Payments accepted by the bank",
        )?;
        let payments_rejected_total = counter(
            &registry,
            "payments_rejected_total",
            "Payments rejected by the bank",
        )?;
        let payments_invalid_total = counter(
            &registry,
            "payments_invalid_total",
            "Requests that failed validation",
        )?;
        let gateway_failures_total = counter(
            &registry,
            "gateway_failures_total",
            "Gateway calls that timed out or could not connect",
        )?;
        let internal_errors_total = counter(
            &registry,
            "internal_errors_total",
            "Requests that failed inside the relay",
        )?;

        // The gateway timeout is 30s, so the top buckets matter.
        let gateway_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "gateway_latency_seconds",
                "Bank gateway round-trip latency in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0]),
        )?;
        registry.register(Box::new(gateway_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            payments_completed_total,
            payments_rejected_total,
            payments_invalid_total,
            gateway_failures_total,
            internal_errors_total,
            gateway_latency_seconds,
        })
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

pub type SharedMetrics = Arc<RelayMetrics>;

/// Renders `/metrics` in Prometheus text format.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
