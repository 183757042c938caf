use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use serde::Serialize;

use crate::AppState;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::payments::{self, SIGNATURE_HEADER, SignatureError, WebhookEnvelope};

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

fn rejection(err: SignatureError) -> AppError {
    match err {
        SignatureError::MissingSignature => AppError::BadRequest("Missing webhook signature".into()),
        SignatureError::MissingSecret => {
            tracing::error!("Webhook received but MAXELPAY_SECRET is not configured");
            AppError::BadRequest("Webhook secret not configured".into())
        }
        SignatureError::Malformed | SignatureError::Mismatch => {
            AppError::Unauthorized("Invalid signature".into())
        }
    }
}

/// Gateway payment notifications. The body is taken as raw bytes so the
/// HMAC is computed over exactly what was sent; it is parsed only after
/// the signature checks out. Every verified request is acknowledged with
/// 200 so the gateway does not retry.
pub async fn handle_maxelpay_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>> {
    let signature = match headers.get(SIGNATURE_HEADER) {
        Some(value) => match value.to_str() {
            Ok(s) => Some(s),
            Err(_) => {
                tracing::warn!(reason = %SignatureError::Malformed, "Webhook signature rejected");
                return Err(rejection(SignatureError::Malformed));
            }
        },
        None => None,
    };

    if let Err(err) = payments::verify(&body, signature, state.webhook_secret.as_deref()) {
        if err.is_not_attempted() {
            tracing::info!(reason = %err, "Webhook verification not attempted");
        } else {
            tracing::warn!(reason = %err, body_len = body.len(), "Webhook signature rejected");
        }
        return Err(rejection(err));
    }

    match serde_json::from_slice::<WebhookEnvelope>(&body) {
        Ok(envelope) => {
            payments::dispatch(&envelope);
        }
        Err(e) => {
            tracing::error!(error = %e, "Verified webhook body is not a valid event envelope");
        }
    }

    Ok(Json(WebhookAck { received: true }))
}
