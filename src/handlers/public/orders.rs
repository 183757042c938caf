use axum::extract::State;
use serde::Serialize;

use crate::AppState;
use crate::email::MailError;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::models::SubmitOrder;

#[derive(Debug, Serialize)]
pub struct SubmitOrderResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(rename = "ref")]
    pub reference: String,
}

pub async fn submit_order(
    State(state): State<AppState>,
    Json(request): Json<SubmitOrder>,
) -> Result<Json<SubmitOrderResponse>> {
    let order = request
        .validate()
        .map_err(|e| AppError::BadRequest(e.message().into()))?;

    let notifier = state.notifier.clone().ok_or_else(|| {
        AppError::Config("SHOP_EMAIL, MAIL_HOST, MAIL_PORT, MAIL_USER or MAIL_PASS not set".into())
    })?;

    match notifier.notify(&order).await {
        Ok(()) => {}
        Err(MailError::InvalidCustomerAddress(address)) => {
            tracing::info!(reference = %order.reference, address = %address, "Rejected order with invalid email");
            return Err(AppError::BadRequest("Invalid customer email address".into()));
        }
        Err(e) => {
            tracing::error!(reference = %order.reference, error = %e, "Failed to send order emails");
            return Err(AppError::internal_with_details(
                "Failed to send order confirmation",
                e.to_string(),
                state.expose_error_details,
            ));
        }
    }

    Ok(Json(SubmitOrderResponse {
        success: true,
        message: "Order submitted and confirmation emails sent",
        reference: order.reference,
    }))
}
