use std::collections::BTreeMap;

use axum::{extract::State, http::HeaderMap};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::AppState;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::models::NumericValue;
use crate::payments::{Currency, GatewayError, PaymentRequest, generate_reference};
use crate::util::{extract_request_info, request_origin};

/// Checkout request from the storefront. `amount` may be a JSON number or a
/// numeric string.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    #[serde(default)]
    pub amount: Option<NumericValue>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentResponse {
    pub success: bool,
    /// Gateway response, passed through unchanged
    pub payment: Value,
    pub payment_url: String,
    pub payment_id: Option<String>,
    pub reference: String,
    pub amount: f64,
    pub currency: Currency,
    pub expires_at: Option<String>,
    pub message: &'static str,
}

/// Validate amount and currency. Runs before anything touches the gateway.
fn validate(request: &CreatePaymentRequest) -> Result<(f64, Currency)> {
    let (Some(amount), Some(currency)) = (
        request.amount.as_ref().filter(|a| !a.is_empty()),
        request
            .currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty()),
    ) else {
        return Err(AppError::BadRequest(
            "Missing parameters: amount and currency are required".into(),
        ));
    };

    let amount = amount
        .as_f64()
        .filter(|a| a.is_finite() && *a > 0.0)
        .ok_or_else(|| AppError::BadRequest("Amount must be a positive number".into()))?;

    let currency = currency.parse::<Currency>().map_err(|_| {
        AppError::BadRequest(format!(
            "Unsupported currency. Accepted currencies: {}",
            <Currency as strum::VariantNames>::VARIANTS.join(", ")
        ))
    })?;

    Ok((amount, currency))
}

/// Translate a gateway failure into the response the storefront sees.
/// Upstream authentication problems are masked so nothing about our
/// credentials reaches the client.
pub fn gateway_error_response(err: GatewayError, expose_details: bool) -> AppError {
    match &err {
        GatewayError::Status { status, body } => {
            tracing::error!(status = *status, body = %body, "Payment gateway returned an error");
        }
        other => tracing::error!(error = %other, "Payment gateway call failed"),
    }

    match err {
        GatewayError::Status { status: 401, .. } => {
            AppError::internal("Payment service authentication error")
        }
        GatewayError::Status { status: 400, .. } => {
            AppError::BadRequest("Invalid payment data".into())
        }
        GatewayError::Status { status: 429, .. } => {
            AppError::RateLimited("Too many requests. Please retry in a few minutes.".into())
        }
        GatewayError::Status { status: 500..=599, .. } => {
            AppError::BadGateway("Payment service error. Please retry.".into())
        }
        GatewayError::Network(_) => AppError::Unavailable(
            "Payment service temporarily unavailable. Please retry.".into(),
        ),
        GatewayError::InvalidResponse(_) => {
            AppError::BadGateway("Invalid response from payment service".into())
        }
        other => AppError::internal_with_details("Payment gateway error", other.to_string(), expose_details),
    }
}

pub async fn create_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<Json<CreatePaymentResponse>> {
    let (amount, currency) = validate(&request)?;

    let gateway = state
        .gateway
        .clone()
        .ok_or_else(|| AppError::Config("MAXELPAY_KEY or MAXELPAY_SECRET not set".into()))?;

    let now = Utc::now();
    let reference = generate_reference(now.timestamp_millis());
    let origin = request_origin(&headers, &state.default_origin);
    let (ip, user_agent) = extract_request_info(&headers);

    let mut metadata = BTreeMap::new();
    metadata.insert("source".to_string(), Value::from("luxio-website"));
    metadata.insert("reference".to_string(), Value::from(reference.clone()));
    metadata.insert(
        "timestamp".to_string(),
        Value::from(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    metadata.insert("user_agent".to_string(), user_agent.map_or(Value::Null, Value::from));
    metadata.insert("ip".to_string(), ip.map_or(Value::Null, Value::from));

    let payment_request = PaymentRequest {
        amount,
        currency,
        reference: reference.clone(),
        description: format!("Luxio payment - {}", reference),
        callback_url: format!("{}/payment-callback", origin),
        success_url: format!("{}/payment-success", origin),
        cancel_url: format!("{}/payment-cancel", origin),
        customer_email: request.customer_email.unwrap_or_default(),
        customer_name: request.customer_name.unwrap_or_default(),
        metadata,
    };

    tracing::info!(
        reference = %reference,
        amount,
        currency = %currency,
        "Creating gateway payment"
    );

    let payment = gateway
        .create_payment(&payment_request)
        .await
        .map_err(|e| gateway_error_response(e, state.expose_error_details))?;

    tracing::info!(
        reference = %reference,
        payment_id = payment.id.as_deref().unwrap_or("-"),
        "Gateway payment created"
    );

    Ok(Json(CreatePaymentResponse {
        success: true,
        payment: payment.raw,
        payment_url: payment.payment_url,
        payment_id: payment.id,
        reference,
        amount,
        currency,
        expires_at: payment.expires_at,
        message: "Payment link created",
    }))
}
