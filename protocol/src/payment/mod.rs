//! # Payment Module
//!
//! Client-facing request validation and gateway payload construction.
//!
//! ```text
//! validation.rs - PaymentRequest and the pre-flight validator
//! builder.rs    - GatewayPayload and the field-encrypting builder
//! ```
//!
//! Nothing here touches the network or the database. A request that fails
//! validation never reaches the cipher.

pub mod builder;
pub mod validation;

pub use builder::{build_payload, C2pPayment, GatewayPayload};
pub use validation::{validate, validate_value, PaymentRequest, ValidationError};
