use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{GatewayError, GatewayPayment, PaymentGateway, PaymentRequest};
use crate::config::GatewayConfig;

const USER_AGENT: &str = concat!("Luxio-Backend/", env!("CARGO_PKG_VERSION"));

/// The gateway has used `paymentUrl`, `checkout_url` and `payment_url` for
/// the hosted page; the first non-empty one wins.
const PAYMENT_URL_FIELDS: [&str; 3] = ["paymentUrl", "checkout_url", "payment_url"];
const EXPIRES_AT_FIELDS: [&str; 2] = ["expiresAt", "expires_at"];

#[derive(Debug, Clone)]
pub struct MaxelpayClient {
    client: Client,
    api_key: String,
    api_secret: String,
    endpoint: String,
}

impl MaxelpayClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GatewayError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl PaymentGateway for MaxelpayClient {
    async fn create_payment(&self, request: &PaymentRequest) -> Result<GatewayPayment, GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("X-API-Secret", &self.api_secret)
            .header("Accept", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        parse_payment(raw)
    }
}

/// Strings as-is, numbers in their JSON form, anything else ignored.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_field(raw: &Value, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| raw.get(*name).and_then(scalar_text))
}

fn parse_payment(raw: Value) -> Result<GatewayPayment, GatewayError> {
    let payment_url = PAYMENT_URL_FIELDS
        .iter()
        .find_map(|name| raw.get(*name).and_then(Value::as_str).filter(|u| !u.is_empty()))
        .map(String::from)
        .ok_or_else(|| GatewayError::InvalidResponse("missing payment URL".into()))?;

    // Ids and expiry timestamps come back as strings or numbers depending on the API version
    let id = first_field(&raw, &["id"]);
    let expires_at = first_field(&raw, &EXPIRES_AT_FIELDS);

    Ok(GatewayPayment {
        id,
        payment_url,
        expires_at,
        raw,
    })
}
