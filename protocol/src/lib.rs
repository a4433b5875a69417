// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # C2P Protocol - Core Library
//!
//! Everything the relay needs to turn a web client's mobile-payment request
//! into a call the bank's C2P gateway will accept, and to remember what
//! happened afterwards.
//!
//! The gateway dictates the wire format down to the cipher mode: sensitive
//! fields travel as base64 AES-128-ECB ciphertext under a key derived from
//! the merchant's secret. That scheme is not ours to improve. If the bank
//! can't decrypt it, the payment doesn't happen.
//!
//! ## Architecture
//!
//! - **config** - Constants and the startup configuration (`RelayConfig`).
//! - **crypto** - Key derivation and the fixed-parameter block cipher.
//! - **payment** - Request validation and gateway payload construction.
//! - **gateway** - Outbound HTTP client and bank-response interpretation.
//! - **storage** - Insert-only transaction records on sled.
//! - **service** - The request path tying the above together.
//!
//! ## Request Flow
//!
//! ```text
//! validate ─► build_payload ─► PaymentGateway::submit ─► interpret_reply ─► RelayDB
//!                 │
//!                 └─► encrypt ─► derive_key (once, at startup)
//! ```

pub mod config;
pub mod crypto;
pub mod gateway;
pub mod payment;
pub mod service;
pub mod storage;

pub use config::{CipherConfig, ConfigError, RelayConfig};
pub use service::{PaymentReceipt, PaymentService, RelayError};
