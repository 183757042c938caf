//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use serde_json::{Value, json};

pub use luxio::AppState;
use luxio::catalog::{Catalog, parse_catalog};
use luxio::email::{Locale, MailError, Mailer, OrderNotifier, OutgoingEmail};
use luxio::payments::{GatewayError, GatewayPayment, PaymentGateway, PaymentRequest};
use luxio::storage::MemoryStorage;

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";
pub const SHOP_EMAIL: &str = "shop@luxio.test";

// ============ Catalog ============

pub fn test_catalog() -> Catalog {
    let document = json!({
        "smartphones": [
            {
                "id": "iphone-15-pro",
                "title": "iPhone 15 Pro 128GB",
                "brand": "Apple",
                "model": "iPhone 15 Pro",
                "price": 1229,
                "originalPrice": 1299,
                "thumbnail": "img/iphone.png",
                "rating": 4.8,
                "inStock": true,
                "isFeatured": true,
                "storage": "128 GB",
                "createdAt": "2023-09-22"
            },
            {
                "id": "galaxy-s24",
                "title": "Galaxy S24 256GB",
                "brand": "Samsung",
                "price": 899,
                "rating": 4.6,
                "inStock": true,
                "isNew": true,
                "storage": "256 GB",
                "createdAt": "2024-01-31"
            },
            {
                "id": "pixel-8",
                "title": "Pixel 8",
                "brand": "Google",
                "price": 699,
                "rating": 4.5,
                "inStock": false,
                "storage": "128 GB",
                "shortDescription": "Best camera on Android"
            }
        ],
        "watches": [
            {
                "id": "watch-9",
                "title": "Apple Watch Series 9",
                "brand": "Apple",
                "price": 449,
                "inStock": true
            }
        ],
        "lastUpdated": "2024-05-01"
    });

    parse_catalog(document.to_string().as_bytes()).unwrap()
}

// ============ Gateway double ============

#[derive(Debug, Clone)]
pub enum GatewayReply {
    Payment(Value),
    Status(u16),
    Network,
}

/// Records every payment request and answers with a canned reply.
pub struct MockGateway {
    reply: GatewayReply,
    calls: AtomicUsize,
    requests: Mutex<Vec<PaymentRequest>>,
}

impl MockGateway {
    pub fn new(reply: GatewayReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn paying(payment_url: &str) -> Arc<Self> {
        Self::new(GatewayReply::Payment(json!({
            "id": "p1",
            "paymentUrl": payment_url,
        })))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<PaymentRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_payment(&self, request: &PaymentRequest) -> Result<GatewayPayment, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        match &self.reply {
            GatewayReply::Payment(raw) => Ok(GatewayPayment {
                id: raw["id"].as_str().map(String::from),
                payment_url: raw["paymentUrl"].as_str().unwrap_or_default().to_string(),
                expires_at: None,
                raw: raw.clone(),
            }),
            GatewayReply::Status(status) => Err(GatewayError::Status {
                status: *status,
                body: format!("{{\"error\":\"upstream said {}\"}}", status),
            }),
            GatewayReply::Network => Err(GatewayError::Network("connection refused".into())),
        }
    }
}

// ============ Mailer doubles ============

/// Keeps every message instead of sending it. Fails the `fail_at`-th send
/// (zero-based) when set.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    fail_at: Option<usize>,
    attempts: AtomicUsize,
}

impl RecordingMailer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_at(index: usize) -> Arc<Self> {
        Arc::new(Self {
            fail_at: Some(index),
            ..Default::default()
        })
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == Some(attempt) {
            return Err(MailError::Transport("connection reset by peer".into()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub fn notifier(mailer: Arc<RecordingMailer>, locale: Locale) -> Arc<OrderNotifier> {
    Arc::new(OrderNotifier::new(mailer, "orders@luxio.test", SHOP_EMAIL, locale).unwrap())
}

// ============ App state ============

/// State with no gateway, no mailer and no webhook secret.
pub fn create_test_app_state() -> AppState {
    AppState {
        gateway: None,
        webhook_secret: None,
        notifier: None,
        catalog: Arc::new(test_catalog()),
        storage: Arc::new(MemoryStorage::new()),
        default_origin: "https://luxio.com".to_string(),
        expose_error_details: false,
    }
}

pub fn state_with_gateway(gateway: Arc<dyn PaymentGateway>) -> AppState {
    AppState {
        gateway: Some(gateway),
        ..create_test_app_state()
    }
}

pub fn state_with_webhook_secret(secret: &str) -> AppState {
    AppState {
        webhook_secret: Some(secret.to_string()),
        ..create_test_app_state()
    }
}

pub fn state_with_notifier(notifier: Arc<OrderNotifier>) -> AppState {
    AppState {
        notifier: Some(notifier),
        ..create_test_app_state()
    }
}

pub fn test_app(state: AppState) -> Router {
    luxio::app(state)
}

// ============ Requests ============

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}
