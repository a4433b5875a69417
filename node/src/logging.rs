//! Log subscriber setup.
//!
//! `RUST_LOG` wins over [`DEFAULT_FILTER`]. Payment fields never reach the
//! logs above `debug`, and the outbound payload is only logged encrypted.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "c2p_node=info,c2p_protocol=info,tower_http=info";

/// Output style selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Colored lines with file and line number, for terminals.
    Pretty,
    /// One JSON object per event, for log shippers.
    Json,
}

impl LogFormat {
    /// `"json"` in any case selects [`LogFormat::Json`]; anything else,
    /// including an empty value, falls back to [`LogFormat::Pretty`].
    pub fn from_str_lossy(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Installs the global subscriber. Must run once, before any other
/// `tracing` call in `main`.
pub fn init_logging(default_filter: &str, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Exactly one of the two layers is present.
    let (pretty, json) = match format {
        LogFormat::Pretty => (
            Some(fmt::layer().with_file(true).with_line_number(true)),
            None,
        ),
        LogFormat::Json => (None, Some(fmt::layer().json().with_current_span(false))),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .init();

    tracing::debug!(?format, "logging initialized");
}
