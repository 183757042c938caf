use serde::Deserialize;

/// Gateway callback body. Only parse this after the signature has been verified.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    PaymentSucceeded,
    PaymentFailed,
    PaymentRefunded,
    Other(String),
}

impl WebhookEvent {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "payment.succeeded" => WebhookEvent::PaymentSucceeded,
            "payment.failed" => WebhookEvent::PaymentFailed,
            "payment.refunded" => WebhookEvent::PaymentRefunded,
            other => WebhookEvent::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            WebhookEvent::PaymentSucceeded => "payment.succeeded",
            WebhookEvent::PaymentFailed => "payment.failed",
            WebhookEvent::PaymentRefunded => "payment.refunded",
            WebhookEvent::Other(tag) => tag,
        }
    }
}

/// What the dispatcher did with a verified envelope. Both outcomes are
/// acknowledged to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Routed(WebhookEvent),
    Ignored(String),
}

#[derive(Debug, Default, Deserialize)]
struct PaymentData {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    amount: Option<serde_json::Value>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    reference: Option<String>,
    #[serde(default)]
    customer: Option<serde_json::Value>,
    #[serde(default)]
    failure_reason: Option<String>,
    #[serde(default)]
    refund_amount: Option<serde_json::Value>,
}

fn field_or_dash(value: &Option<serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "-".to_string(),
    }
}

/// Route a verified envelope to its logging action.
///
/// Order, inventory and database updates are not performed here.
pub fn dispatch(envelope: &WebhookEnvelope) -> DispatchOutcome {
    let event = WebhookEvent::from_tag(&envelope.event);
    // Lenient: an unexpected data shape still gets logged by event name
    let data: PaymentData = serde_json::from_value(envelope.data.clone()).unwrap_or_default();

    match &event {
        WebhookEvent::PaymentSucceeded => {
            tracing::info!(
                payment_id = %field_or_dash(&data.id),
                reference = data.reference.as_deref().unwrap_or("-"),
                amount = %field_or_dash(&data.amount),
                currency = data.currency.as_deref().unwrap_or("-"),
                customer = %field_or_dash(&data.customer),
                "Payment succeeded"
            );
        }
        WebhookEvent::PaymentFailed => {
            tracing::info!(
                payment_id = %field_or_dash(&data.id),
                reference = data.reference.as_deref().unwrap_or("-"),
                reason = data.failure_reason.as_deref().unwrap_or("-"),
                "Payment failed"
            );
        }
        WebhookEvent::PaymentRefunded => {
            tracing::info!(
                payment_id = %field_or_dash(&data.id),
                reference = data.reference.as_deref().unwrap_or("-"),
                refund_amount = %field_or_dash(&data.refund_amount),
                "Payment refunded"
            );
        }
        WebhookEvent::Other(tag) => {
            tracing::warn!(event = %tag, "Unhandled webhook event");
            return DispatchOutcome::Ignored(tag.clone());
        }
    }

    DispatchOutcome::Routed(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(json: &str) -> WebhookEnvelope {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_routes_known_events() {
        let cases = [
            ("payment.succeeded", WebhookEvent::PaymentSucceeded),
            ("payment.failed", WebhookEvent::PaymentFailed),
            ("payment.refunded", WebhookEvent::PaymentRefunded),
        ];
        for (tag, expected) in cases {
            let env = envelope(&format!(r#"{{"event":"{}","data":{{"id":"x"}}}}"#, tag));
            assert_eq!(dispatch(&env), DispatchOutcome::Routed(expected));
        }
    }

    #[test]
    fn test_unknown_event_is_ignored() {
        let env = envelope(r#"{"event":"payment.disputed","data":{}}"#);
        assert_eq!(dispatch(&env), DispatchOutcome::Ignored("payment.disputed".into()));
    }

    #[test]
    fn test_missing_or_odd_data_still_routes() {
        let env = envelope(r#"{"event":"payment.failed"}"#);
        assert_eq!(dispatch(&env), DispatchOutcome::Routed(WebhookEvent::PaymentFailed));

        let env = envelope(r#"{"event":"payment.succeeded","data":[1,2,3]}"#);
        assert_eq!(dispatch(&env), DispatchOutcome::Routed(WebhookEvent::PaymentSucceeded));
    }

    #[test]
    fn test_field_or_dash() {
        assert_eq!(field_or_dash(&Some(serde_json::json!("pay_1"))), "pay_1");
        assert_eq!(field_or_dash(&Some(serde_json::json!(12.5))), "12.5");
        assert_eq!(field_or_dash(&None), "-");
    }

    #[test]
    fn test_tag_roundtrip() {
        assert_eq!(WebhookEvent::from_tag("payment.refunded").as_str(), "payment.refunded");
        assert_eq!(WebhookEvent::from_tag("checkout.expired").as_str(), "checkout.expired");
    }
}
