//! Offline walkthrough of the relay's request path.
//!
//! Derives the cipher key, validates a checkout request, builds the
//! encrypted gateway payload, interprets a few typical bank replies, and
//! stores the resulting records in a throwaway database. No network access.
//!
//! Run with:
//!   cargo run --example demo

use std::time::Instant;

use serde_json::json;

use c2p_protocol::config::{RelayConfig, RelaySettings, CIPHER_SCHEME};
use c2p_protocol::crypto::{decrypt, derive_key};
use c2p_protocol::gateway::{client_status, interpret_reply, GatewayOutcome, GatewayReply};
use c2p_protocol::payment::{build_payload, validate};
use c2p_protocol::storage::{RelayDB, TransactionRecord};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn section(num: u32, title: &str) {
    println!();
    println!("{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]======================================================{RESET}");
    println!("{BOLD}{WHITE}  {title}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn failure(text: &str) {
    println!("{RED}  [NO] {text}{RESET}");
}

fn timing(label: &str, elapsed: std::time::Duration) {
    let micros = elapsed.as_secs_f64() * 1_000_000.0;
    println!("{DIM}  [{label}: {micros:.1} us]{RESET}");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("{BOLD}C2P relay demo{RESET}  {DIM}({CIPHER_SCHEME}){RESET}");

    // --- 1. Configuration ---------------------------------------------------
    section(1, "Relay configuration");
    let config = RelayConfig::from_settings(RelaySettings {
        merchant_id: Some("200284".into()),
        terminal_id: Some("abcde".into()),
        cipher_key: Some("A11103402525120190822HB01".into()),
        client_id: Some("demo-client".into()),
        gateway_url: Some("https://bank.example/mercantil/c2p".into()),
        destination_id: Some("V18367443".into()),
        destination_phone: Some("584241513063".into()),
        destination_bank_code: Some("0105".into()),
        description: None,
    })?;
    info("merchant", &config.merchant_id);
    info("description", &config.description);

    let started = Instant::now();
    let key = derive_key("A11103402525120190822HB01")?;
    timing("derive_key", started.elapsed());
    success("cipher key derived");

    // --- 2. Validation ------------------------------------------------------
    section(2, "Validating a checkout request");
    let body = serde_json::to_vec(&json!({
        "c2pPhone": "584142591177",
        "purchaseKey": "1234",
        "amount": "10.50",
        "origin": "demo-shop",
        "checkoutData": { "orderId": "ORD-1" }
    }))?;
    let request = validate(&body)?;
    info("amount", &request.amount.to_string());

    match validate(br#"{"c2pPhone":"584142591177"}"#) {
        Ok(_) => failure("incomplete request was accepted"),
        Err(e) => success(&format!("incomplete request refused: {e}")),
    }

    // --- 3. Payload ---------------------------------------------------------
    section(3, "Building the gateway payload");
    let started = Instant::now();
    let payload = build_payload(&request, &config)?;
    timing("build_payload", started.elapsed());
    println!("{DIM}{}{RESET}", serde_json::to_string_pretty(&payload)?);

    let phone = decrypt(key.as_bytes(), &payload.c2p_payment.origin_phone)?;
    info("origin_phone decrypts to", &phone);

    // --- 4. Replies ---------------------------------------------------------
    section(4, "Interpreting bank replies");
    let db = RelayDB::open_temporary()?;
    let replies = [
        GatewayReply::new(200, r#"{"reference":"000123","message":"Pago aprobado"}"#),
        GatewayReply::new(400, r#"{"code":99999,"message":"Internal"}"#),
        GatewayReply::new(200, r#"{"errors":[{"message":"Clave de compra invalida"}]}"#),
        GatewayReply::new(502, "<html>Bad Gateway</html>"),
    ];

    for reply in replies {
        let upstream = reply.status;
        let record = match interpret_reply(reply) {
            GatewayOutcome::Accepted(body) => {
                success(&format!("HTTP {upstream}: accepted"));
                TransactionRecord::completed(&request, body)
            }
            GatewayOutcome::Rejected(rejection) => {
                failure(&format!(
                    "HTTP {upstream} -> client {}: {}",
                    client_status(rejection.status),
                    rejection.message
                ));
                TransactionRecord::rejected(&request, rejection.body)
            }
        };
        db.insert_record(&record)?;
    }

    // --- 5. Storage ---------------------------------------------------------
    section(5, "Stored records");
    info("records", &db.record_count().to_string());
    success("done");
    Ok(())
}
