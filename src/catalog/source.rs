use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use super::Catalog;
use crate::models::Product;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog source returned no products")]
    Empty,
}

/// Where products come from. The static JSON file is the trusted source;
/// anything else is a best-effort fallback that is allowed to fail.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn load(&self) -> Result<Catalog, CatalogError>;
}

/// Parse the `{category: [product, ...]}` document. Non-array values are skipped.
pub fn parse_catalog(bytes: &[u8]) -> Result<Catalog, CatalogError> {
    let document: BTreeMap<String, serde_json::Value> = serde_json::from_slice(bytes)?;

    let mut categories = BTreeMap::new();
    for (name, value) in document {
        if !value.is_array() {
            tracing::debug!(category = %name, "Skipping non-array catalog entry");
            continue;
        }
        let products: Vec<Product> = serde_json::from_value(value)?;
        categories.insert(name, products);
    }

    Ok(Catalog::new(categories))
}

#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for JsonFileSource {
    fn name(&self) -> &'static str {
        "json-file"
    }

    async fn load(&self) -> Result<Catalog, CatalogError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|source| CatalogError::Io {
            path: self.path.clone(),
            source,
        })?;
        parse_catalog(&bytes)
    }
}

/// Minimal built-in catalog so the storefront is never blank.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSource;

#[async_trait]
impl CatalogSource for BuiltinSource {
    fn name(&self) -> &'static str {
        "builtin"
    }

    async fn load(&self) -> Result<Catalog, CatalogError> {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": "iphone-15-pro-fallback",
            "title": "iPhone 15 Pro 128GB",
            "brand": "Apple",
            "model": "iPhone 15 Pro",
            "category": "smartphones",
            "storage": "128 GB",
            "price": 1229,
            "originalPrice": 1299,
            "currency": "EUR",
            "discount": 5,
            "thumbnail": "img/product-1.png",
            "inStock": true,
            "rating": 4.8,
            "reviewCount": 124,
            "isNew": true,
            "isFeatured": true
        }))?;

        let mut categories = BTreeMap::new();
        categories.insert("smartphones".to_string(), vec![product]);
        Ok(Catalog::new(categories))
    }
}

/// Try `primary`; on error or an empty result, log and use `fallback`.
pub struct FallbackSource<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackSource<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl<P: CatalogSource, F: CatalogSource> CatalogSource for FallbackSource<P, F> {
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    async fn load(&self) -> Result<Catalog, CatalogError> {
        let error = match self.primary.load().await {
            Ok(catalog) if !catalog.is_empty() => return Ok(catalog),
            Ok(_) => CatalogError::Empty,
            Err(e) => e,
        };

        tracing::warn!(
            source = self.primary.name(),
            fallback = self.fallback.name(),
            error = %error,
            "Primary catalog source failed, using fallback"
        );
        self.fallback.load().await
    }
}
