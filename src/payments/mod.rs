mod events;
mod maxelpay;
mod signature;

pub use events::*;
pub use maxelpay::*;
pub use signature::*;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantNames};
use thiserror::Error;

/// Currencies the storefront accepts at checkout.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString, VariantNames,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Currency {
    Eur,
    Usd,
    Btc,
    Eth,
}

/// Outbound payment creation payload sent to the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRequest {
    pub amount: f64,
    pub currency: Currency,
    pub reference: String,
    pub description: String,
    pub callback_url: String,
    pub success_url: String,
    pub cancel_url: String,
    pub customer_email: String,
    pub customer_name: String,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// Gateway answer to a successful payment creation.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayPayment {
    pub id: Option<String>,
    pub payment_url: String,
    pub expires_at: Option<String>,
    /// Full response body, passed through to the storefront
    pub raw: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway answered with a non-success status.
    #[error("gateway returned HTTP {status}")]
    Status { status: u16, body: String },

    /// The request never produced a response (DNS, connect, timeout).
    #[error("gateway unreachable: {0}")]
    Network(String),

    /// The gateway answered 2xx but the body is unusable.
    #[error("invalid gateway response: {0}")]
    InvalidResponse(String),
}

/// Abstraction over the payment gateway so handlers can be exercised
/// without network access.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment(&self, request: &PaymentRequest) -> Result<GatewayPayment, GatewayError>;
}

const REFERENCE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a payment reference: `LX-<last 6 digits of ms timestamp>-<6 random>-CRYPTO`.
///
/// Uniqueness is probabilistic; nothing checks for prior use.
pub fn generate_reference(now_millis: i64) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();

    let timestamp = format!("{:06}", now_millis.rem_euclid(1_000_000));
    let suffix: String = (0..6)
        .map(|_| REFERENCE_CHARSET[rng.gen_range(0..REFERENCE_CHARSET.len())] as char)
        .collect();

    format!("LX-{}-{}-CRYPTO", timestamp, suffix)
}
