//! Payment gateway integration.
//!
//! Outbound order creation and status queries are signed requests against
//! the gateway's HTTP API; the inbound IPN callback is verified with the
//! same HMAC scheme before any state is touched.

mod client;
pub mod signature;
pub mod types;

use std::fmt;

pub use client::{HttpPaymentGateway, MockPaymentGateway, PaymentGateway};

use thiserror::Error;

/// Shared secret used to sign gateway traffic.
#[derive(Clone)]
pub struct GatewaySecret(String);

impl GatewaySecret {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for GatewaySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GatewaySecret(**redacted**)")
    }
}

/// Merchant-side gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the gateway API, e.g. `https://gateway.example/v2`.
    pub endpoint: String,
    pub partner_code: String,
    pub partner_name: String,
    pub store_id: String,
    pub access_key: String,
    pub secret_key: GatewaySecret,
    /// Where the gateway sends the payer after checkout.
    pub redirect_url: String,
    /// Where the gateway posts the IPN callback.
    pub ipn_url: String,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed")]
    Request(#[source] reqwest::Error),

    #[error("gateway rejected the order: {0}")]
    Rejected(String),

    #[error("gateway signature mismatch")]
    InvalidSignature,

    #[error("signature computation failed")]
    Signature,
}
