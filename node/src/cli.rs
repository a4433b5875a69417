//! # CLI Interface
//!
//! Defines the command-line argument structure for `c2p-node` using
//! `clap` derive. Two subcommands: `run` and `version`.
//!
//! Every relay setting can come from a flag or from its environment
//! variable. `main` loads a `.env` file before parsing, so values there are
//! picked up too.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use c2p_protocol::config::{self, RelaySettings};

/// C2P payment relay.
///
/// Accepts mobile-payment requests from web checkouts, encrypts the
/// sensitive fields, forwards them to the bank's C2P gateway, and stores a
/// record of every answered attempt.
#[derive(Parser, Debug)]
#[command(
    name = "c2p-node",
    about = "C2P payment relay",
    version,
    propagate_version = true
)]
pub struct RelayCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the relay binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the relay HTTP server.
    Run(RunArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
///
/// Required gateway settings are `Option` here on purpose: the relay reports
/// every missing one at once instead of stopping at the first.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Merchant identifier assigned by the bank.
    #[arg(long, env = config::ENV_MERCHANT_ID)]
    pub merchant_id: Option<String>,

    /// Terminal identifier assigned by the bank.
    #[arg(long, env = config::ENV_TERMINAL_ID)]
    pub terminal_id: Option<String>,

    /// Shared secret the AES key is derived from.
    #[arg(long, env = config::ENV_CIPHER_KEY, hide_env_values = true)]
    pub cipher_key: Option<String>,

    /// Value for the gateway's client-id header.
    #[arg(long, env = config::ENV_CLIENT_ID, hide_env_values = true)]
    pub client_id: Option<String>,

    /// Full URL of the bank's C2P endpoint.
    #[arg(long, env = config::ENV_GATEWAY_URL)]
    pub gateway_url: Option<String>,

    /// Merchant's national ID (sent encrypted).
    #[arg(long, env = config::ENV_DESTINATION_ID)]
    pub destination_id: Option<String>,

    /// Merchant's receiving phone number.
    #[arg(long, env = config::ENV_DESTINATION_PHONE)]
    pub destination_phone: Option<String>,

    /// Merchant's bank code.
    #[arg(long, env = config::ENV_DESTINATION_BANK_CODE)]
    pub destination_bank_code: Option<String>,

    /// Description attached to every payment.
    #[arg(long, env = config::ENV_DESCRIPTION)]
    pub description: Option<String>,

    /// Port for the payment API.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "METRICS_PORT", default_value_t = 9742)]
    pub metrics_port: u16,

    /// Directory holding the transaction database.
    #[arg(long, short = 'd', env = "C2P_DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

impl RunArgs {
    /// The gateway-facing subset, ready for `RelayConfig::from_settings`.
    pub fn relay_settings(&self) -> RelaySettings {
        RelaySettings {
            merchant_id: self.merchant_id.clone(),
            terminal_id: self.terminal_id.clone(),
            cipher_key: self.cipher_key.clone(),
            client_id: self.client_id.clone(),
            gateway_url: self.gateway_url.clone(),
            destination_id: self.destination_id.clone(),
            destination_phone: self.destination_phone.clone(),
            destination_bank_code: self.destination_bank_code.clone(),
            description: self.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        RelayCli::command().debug_assert();
    }

    #[test]
    fn flags_feed_relay_settings() {
        let cli = RelayCli::try_parse_from([
            "c2p-node",
            "run",
            "--merchant-id",
            "200284",
            "--gateway-url",
            "https://bank.example/c2p",
            "--port",
            "8080",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.port, 8080);
        let settings = args.relay_settings();
        assert_eq!(settings.merchant_id.as_deref(), Some("200284"));
        assert_eq!(settings.gateway_url.as_deref(), Some("https://bank.example/c2p"));
    }
}
