//! Per-session shopping cart and wishlist, persisted through a [`StorageAdapter`].
//!
//! Both collections are stored as a JSON array under a session-scoped key.
//! Prices are always taken from the catalog, never from the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::models::Product;
use crate::storage::{StorageAdapter, StorageError, keys};

const NO_STORAGE_LABEL: &str = "N/A";

/// Upper bound on the quantity of a single cart line.
pub const MAX_LINE_QUANTITY: u32 = 99;

fn load_items<T: DeserializeOwned>(storage: &dyn StorageAdapter, key: &str) -> Vec<T> {
    let Some(raw) = storage.get(key) else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Discarding unreadable stored collection");
            Vec::new()
        }
    }
}

fn save_items<T: Serialize>(storage: &dyn StorageAdapter, key: &str, items: &[T]) -> Result<(), StorageError> {
    if items.is_empty() {
        return storage.remove(key);
    }
    storage.set(key, &serde_json::to_string(items)?)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub title: String,
    pub brand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub price: f64,
    pub image: String,
    pub quantity: u32,
    pub storage: String,
}

impl CartItem {
    fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            brand: product.brand.clone(),
            model: product.model.clone(),
            price: product.price,
            image: product.image().to_string(),
            quantity,
            storage: product
                .storage
                .clone()
                .unwrap_or_else(|| NO_STORAGE_LABEL.to_string()),
        }
    }

    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Serialized cart view returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub items: Vec<CartItem>,
    pub total: f64,
    pub total_items: u32,
}

pub struct Cart<'a> {
    storage: &'a dyn StorageAdapter,
    key: String,
    items: Vec<CartItem>,
}

impl<'a> Cart<'a> {
    pub fn load(storage: &'a dyn StorageAdapter, session: &str) -> Self {
        let key = keys::scoped(session, keys::CART);
        let items = load_items(storage, &key);
        Self { storage, key, items }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Add `quantity` units, merging with an existing line for the same product.
    /// The line is capped at [`MAX_LINE_QUANTITY`].
    pub fn add(&mut self, product: &Product, quantity: u32) -> Result<(), StorageError> {
        match self.items.iter_mut().find(|item| item.id == product.id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(quantity).min(MAX_LINE_QUANTITY)
            }
            None => self
                .items
                .push(CartItem::from_product(product, quantity.min(MAX_LINE_QUANTITY))),
        }
        self.save()
    }

    /// Returns false when the product was not in the cart.
    pub fn remove(&mut self, product_id: &str) -> Result<bool, StorageError> {
        let before = self.items.len();
        self.items.retain(|item| item.id != product_id);
        if self.items.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Set the quantity of a line; zero or less removes it.
    /// Returns false when the product was not in the cart.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> Result<bool, StorageError> {
        if quantity <= 0 {
            return self.remove(product_id);
        }
        let Some(item) = self.items.iter_mut().find(|item| item.id == product_id) else {
            return Ok(false);
        };
        item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        self.save()?;
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.items.clear();
        self.save()
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn total_items(&self) -> u32 {
        self.items.iter().fold(0u32, |n, item| n.saturating_add(item.quantity))
    }

    pub fn summary(&self) -> CartSummary {
        CartSummary {
            items: self.items.clone(),
            total: self.total(),
            total_items: self.total_items(),
        }
    }

    fn save(&self) -> Result<(), StorageError> {
        save_items(self.storage, &self.key, &self.items)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub id: String,
    pub title: String,
    pub brand: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    pub image: String,
    pub added_at: DateTime<Utc>,
}

pub struct Wishlist<'a> {
    storage: &'a dyn StorageAdapter,
    key: String,
    items: Vec<WishlistItem>,
}

impl<'a> Wishlist<'a> {
    pub fn load(storage: &'a dyn StorageAdapter, session: &str) -> Self {
        let key = keys::scoped(session, keys::WISHLIST);
        let items = load_items(storage, &key);
        Self { storage, key, items }
    }

    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.items.iter().any(|item| item.id == product_id)
    }

    /// Returns false when the product was already present.
    pub fn add(&mut self, product: &Product) -> Result<bool, StorageError> {
        if self.contains(&product.id) {
            return Ok(false);
        }
        self.items.push(WishlistItem {
            id: product.id.clone(),
            title: product.title.clone(),
            brand: product.brand.clone(),
            price: product.price,
            original_price: product.original_price,
            image: product.image().to_string(),
            added_at: Utc::now(),
        });
        self.save()?;
        Ok(true)
    }

    pub fn remove(&mut self, product_id: &str) -> Result<bool, StorageError> {
        let before = self.items.len();
        self.items.retain(|item| item.id != product_id);
        if self.items.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Add when absent, remove when present. Returns whether the product is
    /// now on the wishlist.
    pub fn toggle(&mut self, product: &Product) -> Result<bool, StorageError> {
        if self.remove(&product.id)? {
            Ok(false)
        } else {
            self.add(product)
        }
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.items.clear();
        self.save()
    }

    fn save(&self) -> Result<(), StorageError> {
        save_items(self.storage, &self.key, &self.items)
    }
}
