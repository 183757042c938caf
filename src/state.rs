use std::sync::Arc;

use crate::catalog::Catalog;
use crate::email::OrderNotifier;
use crate::payments::PaymentGateway;
use crate::storage::StorageAdapter;

/// Shared handler state. Optional services are `None` when their
/// configuration is missing; the affected endpoints answer with a masked
/// configuration error instead of refusing to start.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Option<Arc<dyn PaymentGateway>>,
    /// HMAC secret for inbound payment notifications
    pub webhook_secret: Option<String>,
    pub notifier: Option<Arc<OrderNotifier>>,
    pub catalog: Arc<Catalog>,
    pub storage: Arc<dyn StorageAdapter>,
    /// Used to build redirect URLs when a request carries no Origin header
    pub default_origin: String,
    /// Include diagnostic `details` in 500 responses (development only)
    pub expose_error_details: bool,
}
